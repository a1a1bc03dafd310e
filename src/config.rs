use log::info;
use std::env;

pub const DEFAULT_MAX_ROWS: u32 = 1000;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Service-account credentials for the Sheets API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub client_email: String,
    /// PEM with real newlines.
    pub private_key: String,
}

/// Where the items live and how to reach them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub sheet_index: usize,
    pub credentials: Credentials,
    pub max_rows: u32,
}

/// Everything read from the environment at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub spreadsheet_id: Option<String>,
    pub sheet_index: usize,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub max_rows: u32,
    pub bind: String,
    pub api_url: String,
}

impl Settings {
    /// Loads `.env.local` and `.env` (if present) and reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank counts as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        Settings {
            spreadsheet_id: first(&[
                "GOOGLE_SHEETS_SPREADSHEET_ID",
                "NEXT_PUBLIC_GOOGLE_SHEETS_SPREADSHEET_ID",
            ]),
            sheet_index: first(&[
                "GOOGLE_SHEETS_SHEET_INDEX",
                "NEXT_PUBLIC_GOOGLE_SHEETS_SHEET_INDEX",
            ])
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0),
            client_email: get("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            private_key: get("GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY")
                .map(|k| k.replace("\\n", "\n")),
            max_rows: get("BIDSHEET_MAX_ROWS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_ROWS),
            bind: get("BIDSHEET_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            api_url: get("BIDSHEET_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }

    /// True iff the spreadsheet id and both credential halves are present.
    pub fn is_configured(&self) -> bool {
        info!(
            "[sheets] config check: spreadsheet_id={} client_email={} private_key={}",
            self.spreadsheet_id.is_some(),
            self.client_email.is_some(),
            self.private_key.is_some()
        );
        self.sheets().is_some()
    }

    pub fn sheets(&self) -> Option<SheetsConfig> {
        Some(SheetsConfig {
            spreadsheet_id: self.spreadsheet_id.clone()?,
            sheet_index: self.sheet_index,
            credentials: Credentials {
                client_email: self.client_email.clone()?,
                private_key: self.private_key.clone()?,
            },
            max_rows: self.max_rows,
        })
    }
}
