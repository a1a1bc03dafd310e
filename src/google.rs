//! Google Sheets v4 backend authenticated as a service account.
//!
//! Every operation opens its own session: it signs a fresh JWT, trades it
//! for an access token, resolves the worksheet by index and then makes the
//! actual call. Nothing is pooled between operations.

use crate::cell::{CellValue, to_text};
use crate::config::SheetsConfig;
use crate::error::BackendError;
use crate::layout::{COLUMN_COUNT, CellWrite, col_to_letter};
use crate::store::SheetBackend;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::ops::Range;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub struct GoogleSheets {
    config: SheetsConfig,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: Option<SheetProperties>,
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: usize,
    grid_properties: Option<GridProperties>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    user_entered_value: Option<ExtendedValue>,
    effective_value: Option<ExtendedValue>,
    formatted_value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedValue {
    number_value: Option<f64>,
    string_value: Option<String>,
    bool_value: Option<bool>,
    formula_value: Option<String>,
}

impl ExtendedValue {
    // Error results read as empty so the price reader falls through to null.
    fn scalar(&self) -> CellValue {
        if let Some(b) = self.bool_value {
            CellValue::Bool(b)
        } else if let Some(n) = self.number_value {
            CellValue::Number(n)
        } else if let Some(s) = &self.string_value {
            CellValue::Text(s.clone())
        } else {
            CellValue::Empty
        }
    }
}

impl From<CellData> for CellValue {
    fn from(cell: CellData) -> Self {
        let computed = cell
            .effective_value
            .as_ref()
            .or(cell.user_entered_value.as_ref())
            .map_or(CellValue::Empty, ExtendedValue::scalar);

        let is_formula = cell
            .user_entered_value
            .as_ref()
            .is_some_and(|v| v.formula_value.is_some());
        if is_formula {
            CellValue::Formula {
                computed: Box::new(computed),
                display: cell.formatted_value,
            }
        } else {
            computed
        }
    }
}

// Values are stored as sent: text stays text even when it looks like a
// date, a number or a formula.
const VALUE_INPUT: &str = "RAW";

/// JSON form of a written value. Booleans and numbers keep their type.
fn cell_json(value: &CellValue) -> Value {
    match value.scalar() {
        CellValue::Bool(b) => json!(b),
        CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(json!(""), Value::Number),
        other => json!(to_text(other)),
    }
}

/// `'Sheet name'` with embedded quotes doubled.
fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range covering rows `rows` (0-based, end-exclusive) over columns A..=V.
fn window_range(title: &str, rows: &Range<u32>) -> String {
    format!(
        "{}!A{}:{}{}",
        quote_title(title),
        rows.start + 1,
        col_to_letter(COLUMN_COUNT),
        rows.end
    )
}

/// Body of a `values:batchUpdate` call, one range per cell.
fn batch_update_body(title: &str, writes: &[CellWrite]) -> Value {
    let title = quote_title(title);
    let data: Vec<Value> = writes
        .iter()
        .map(|w| {
            json!({
                "range": format!("{}!{}", title, w.a1()),
                "values": [[cell_json(&w.value)]],
            })
        })
        .collect();
    json!({ "valueInputOption": VALUE_INPUT, "data": data })
}

fn append_body(row: &[CellValue]) -> Value {
    let values: Vec<Value> = row.iter().map(cell_json).collect();
    json!({ "values": [values] })
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let message = parsed["error"]["message"]
        .as_str()
        .or_else(|| parsed["error_description"].as_str())
        .map(str::to_string)
        .unwrap_or(body);
    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

struct Session {
    http: reqwest::Client,
    token: String,
    sheet: SheetProperties,
}

impl GoogleSheets {
    pub fn new(config: SheetsConfig) -> Self {
        GoogleSheets { config }
    }

    fn assertion(&self) -> Result<String, BackendError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.credentials.client_email,
            scope: SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.config.credentials.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", SHEETS_API, self.config.spreadsheet_id)
    }

    async fn open(&self) -> Result<Session, BackendError> {
        let http = reqwest::Client::new();

        let assertion = self.assertion()?;
        let response = http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let token = check(response).await?.json::<TokenResponse>().await?.access_token;

        let response = http
            .get(self.spreadsheet_url())
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties(title,index,gridProperties(rowCount))")])
            .send()
            .await?;
        let meta: Spreadsheet = check(response).await?.json().await?;

        let index = self.config.sheet_index;
        let sheet = meta
            .sheets
            .into_iter()
            .filter_map(|s| s.properties)
            .find(|p| p.index == index)
            .ok_or(BackendError::SheetNotFound(index))?;

        debug!("[google] opened sheet {:?}", sheet.title);
        Ok(Session { http, token, sheet })
    }
}

impl SheetBackend for GoogleSheets {
    async fn read_rows(&self, rows: Range<u32>) -> Result<Vec<Vec<CellValue>>, BackendError> {
        let session = self.open().await?;
        let row_count = session
            .sheet
            .grid_properties
            .as_ref()
            .map_or(0, |g| g.row_count);
        let rows = rows.start.min(row_count)..rows.end.min(row_count);
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let range = window_range(&session.sheet.title, &rows);
        debug!("[google] loading {}", range);
        let response = session
            .http
            .get(self.spreadsheet_url())
            .bearer_auth(&session.token)
            .query(&[
                ("ranges", range.as_str()),
                ("includeGridData", "true"),
                (
                    "fields",
                    "sheets.data.rowData.values(userEnteredValue,effectiveValue,formattedValue)",
                ),
            ])
            .send()
            .await?;
        let grid: Spreadsheet = check(response).await?.json().await?;

        let sheet = grid
            .sheets
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Malformed("no sheet in grid response".to_string()))?;
        // An all-blank window comes back without any row data.
        let row_data = sheet
            .data
            .into_iter()
            .next()
            .map(|d| d.row_data)
            .unwrap_or_default();

        Ok(row_data
            .into_iter()
            .map(|row| row.values.into_iter().map(CellValue::from).collect())
            .collect())
    }

    async fn write_cells(&self, writes: &[CellWrite]) -> Result<(), BackendError> {
        let session = self.open().await?;
        let body = batch_update_body(&session.sheet.title, writes);

        let response = session
            .http
            .post(format!("{}/values:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn append_row(&self, row: &[CellValue]) -> Result<(), BackendError> {
        let session = self.open().await?;
        let range = window_range(&session.sheet.title, &(0..1));

        let response = session
            .http
            .post(format!(
                "{}/values/{}:append",
                self.spreadsheet_url(),
                urlencoding::encode(&range)
            ))
            .bearer_auth(&session.token)
            .query(&[
                ("valueInputOption", VALUE_INPUT),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&append_body(row))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
