//! HTTP behaviour of the items routes, driven through the router directly.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use bidsheet::app::router;
use bidsheet::cell::CellValue;
use bidsheet::layout::{Column, item_to_row};
use bidsheet::memory::MemorySheet;
use bidsheet::record::{Assignee, NewItem};
use bidsheet::ItemStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn seeded_sheet() -> MemorySheet {
    let sheet = MemorySheet::with_header();
    let item = NewItem {
        product_url: "https://auction.example.com/lots/1".to_string(),
        brand_name: "LOUIS VUITTON ネヴァーフル".to_string(),
        assignee: Assignee::Yoshikawa,
        market_price: Some(120000.0),
        ..Default::default()
    };
    sheet.push_row(item_to_row(&item));
    sheet
}

fn app(sheet: &MemorySheet) -> Router {
    router(ItemStore::new(sheet.clone(), 1000))
}

fn unconfigured_app() -> Router {
    router(ItemStore::<MemorySheet>::unconfigured())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    app: Router,
    method: Method,
    uri: &str,
    body: &'static str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn list_returns_camel_case_items() {
    let sheet = seeded_sheet();
    let (status, body) = send(app(&sheet), Method::GET, "/api/items", None).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "2");
    assert_eq!(items[0]["productUrl"], "https://auction.example.com/lots/1");
    assert_eq!(items[0]["assignee"], "吉川さん");
    assert_eq!(items[0]["marketPrice"], json!(120000.0));
    assert_eq!(items[0]["bidPrice"], Value::Null);
    assert_eq!(items[0]["feedbackConfirmed"], false);
}

#[tokio::test]
async fn patch_writes_only_present_fields() {
    let sheet = seeded_sheet();
    let (status, body) = send(
        app(&sheet),
        Method::PATCH,
        "/api/items/2",
        Some(json!({ "check": true, "marketPrice": null, "notes": "箱なし" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let row = sheet.row(2).unwrap();
    assert_eq!(row[Column::Check.index()], CellValue::Bool(true));
    assert_eq!(row[Column::MarketPrice.index()], CellValue::Text(String::new()));
    assert_eq!(row[Column::Notes.index()], CellValue::from("箱なし"));
    assert_eq!(row[Column::Assignee.index()], CellValue::from("吉川さん"));
}

#[tokio::test]
async fn patch_null_clears_cells() {
    let sheet = seeded_sheet();
    let (status, _) = send(
        app(&sheet),
        Method::PATCH,
        "/api/items/2",
        Some(json!({ "assignee": null, "feedbackConfirmed": null, "notes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let row = sheet.row(2).unwrap();
    assert_eq!(row[Column::Assignee.index()], CellValue::Text(String::new()));
    assert_eq!(row[Column::FeedbackConfirmed.index()], CellValue::Text(String::new()));
    assert_eq!(row[Column::Notes.index()], CellValue::Text(String::new()));
    assert_eq!(row[Column::MarketPrice.index()], CellValue::Number(120000.0));
}

#[tokio::test]
async fn post_accepts_null_text_fields() {
    let sheet = seeded_sheet();
    let (status, body) = send(
        app(&sheet),
        Method::POST,
        "/api/items",
        Some(json!({
            "productUrl": "https://auction.example.com/lots/3",
            "assignee": null,
            "notes": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let row = sheet.row(3).unwrap();
    assert_eq!(row[Column::Assignee.index()], CellValue::Text(String::new()));
    assert_eq!(row[Column::Notes.index()], CellValue::Text(String::new()));
}

#[tokio::test]
async fn patch_rejects_header_and_garbage_ids() {
    let sheet = seeded_sheet();
    for uri in ["/api/items/1", "/api/items/0", "/api/items/abc"] {
        let (status, body) = send(
            app(&sheet),
            Method::PATCH,
            uri,
            Some(json!({ "check": true })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "invalid_id");
    }
    assert_eq!(sheet.calls(), 0);
}

#[tokio::test]
async fn unconfigured_answers_503_everywhere() {
    let (status, body) = send(unconfigured_app(), Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "not_configured");
    assert!(body["message"].as_str().unwrap().contains("GOOGLE_SHEETS_SPREADSHEET_ID"));

    // The configuration check runs before id validation.
    let (status, body) = send(
        unconfigured_app(),
        Method::PATCH,
        "/api/items/1",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "not_configured");

    let (status, _) = send(
        unconfigured_app(),
        Method::POST,
        "/api/items",
        Some(json!({ "productUrl": "https://a" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn backend_failures_carry_the_operation_kind() {
    let sheet = seeded_sheet();
    sheet.fail_with(Some("Requested entity was not found."));

    let (status, body) = send(app(&sheet), Method::GET, "/api/items", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "fetch_failed");
    assert!(body["message"].as_str().unwrap().contains("Requested entity was not found."));

    let (status, body) = send(
        app(&sheet),
        Method::PATCH,
        "/api/items/2",
        Some(json!({ "check": true })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "update_failed");

    let (status, body) = send(
        app(&sheet),
        Method::POST,
        "/api/items",
        Some(json!({ "productUrl": "https://a" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "append_failed");
}

#[tokio::test]
async fn malformed_bodies_fail_the_operation() {
    let sheet = seeded_sheet();

    let (status, body) = send_raw(app(&sheet), Method::PATCH, "/api/items/2", "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "update_failed");

    let (status, body) = send_raw(app(&sheet), Method::POST, "/api/items", "[1, 2]").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "append_failed");
    assert_eq!(sheet.calls(), 0);
}

#[tokio::test]
async fn post_appends_and_lists_the_new_row() {
    let sheet = seeded_sheet();
    let (status, body) = send(
        app(&sheet),
        Method::POST,
        "/api/items",
        Some(json!({
            "productUrl": "https://auction.example.com/lots/2",
            "brandName": "GUCCI ジャッキー",
            "assignee": "伊藤さん",
            "marketPrice": 64000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = send(app(&sheet), Method::GET, "/api/items", None).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["id"], "3");
    assert_eq!(items[1]["assignee"], "伊藤さん");
    assert_eq!(items[1]["marketPrice"], json!(64000.0));
}
