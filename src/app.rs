use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::error::StoreError;
use crate::google::GoogleSheets;
use crate::record::{NewItem, UpdatePayload};
use crate::store::{ItemStore, SheetBackend, parse_row_id};

pub struct AppState<B> {
    store: ItemStore<B>,
}

/// Error body `{error, message}` with its status code.
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    /// `failed_kind` names the operation-specific failure used for backend errors.
    fn from_store(err: StoreError, failed_kind: &'static str) -> Self {
        let kind = match err {
            StoreError::NotConfigured => "not_configured",
            StoreError::InvalidIdentifier(_) => "invalid_id",
            StoreError::Backend(_) => failed_kind,
        };
        ApiError {
            status: StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            kind,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.kind, "message": self.message })),
        )
            .into_response()
    }
}

fn success() -> Response {
    Json(json!({ "success": true })).into_response()
}

pub fn router<B: SheetBackend + 'static>(store: ItemStore<B>) -> Router {
    let app_state = Arc::new(AppState { store });

    Router::new()
        .route("/api/items", get(list_items::<B>).post(create_item::<B>))
        .route("/api/items/:id", patch(update_item::<B>))
        .layer(middleware::from_fn(log_request))
        .with_state(app_state)
}

pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = match settings.sheets() {
        Some(config) => {
            let max_rows = config.max_rows;
            ItemStore::new(GoogleSheets::new(config), max_rows)
        }
        None => ItemStore::unconfigured(),
    };
    if !settings.is_configured() {
        info!("Google Sheets is not configured; item requests will answer 503");
    }

    let app = router(store);

    let listener = TcpListener::bind(&settings.bind).await?;
    info!("Listening on http://{}", settings.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;
    info!(
        "{} {} -> {} ({:.1} ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}

fn log_failure(route: &str, err: &StoreError) {
    error!("[{}] {}", route, err);
}

// Body errors are reported under the operation's own failure kind.
fn parse_body<T: DeserializeOwned>(body: &Bytes, failed_kind: &'static str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        kind: failed_kind,
        message: format!("invalid request body: {}", e),
    })
}

async fn list_items<B: SheetBackend>(State(state): State<Arc<AppState<B>>>) -> Response {
    match state.store.fetch_all().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => {
            log_failure("GET /api/items", &e);
            ApiError::from_store(e, "fetch_failed").into_response()
        }
    }
}

async fn create_item<B: SheetBackend>(
    State(state): State<Arc<AppState<B>>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    state
        .store
        .ensure_configured()
        .map_err(|e| ApiError::from_store(e, "append_failed"))?;
    let item: NewItem = parse_body(&body, "append_failed")?;

    match state.store.append(&item).await {
        Ok(()) => Ok(success()),
        Err(e) => {
            log_failure("POST /api/items", &e);
            Err(ApiError::from_store(e, "append_failed"))
        }
    }
}

async fn update_item<B: SheetBackend>(
    Path(id): Path<String>,
    State(state): State<Arc<AppState<B>>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let to_api = |e| ApiError::from_store(e, "update_failed");

    state.store.ensure_configured().map_err(to_api)?;
    parse_row_id(&id).map_err(to_api)?;
    let payload: UpdatePayload = parse_body(&body, "update_failed")?;

    match state.store.update(&id, &payload).await {
        Ok(()) => Ok(success()),
        Err(e) => {
            log_failure(&format!("PATCH /api/items/{}", id), &e);
            Err(to_api(e))
        }
    }
}
