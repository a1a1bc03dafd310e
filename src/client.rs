use crate::record::{AuctionItem, UpdatePayload};
use crate::workflow::{ApiFailure, ItemsApi};
use serde::Deserialize;

/// Talks to the items endpoints of a running server.
pub struct HttpItemsApi {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl HttpItemsApi {
    pub fn new(base_url: &str) -> Self {
        HttpItemsApi {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn items_url(&self) -> String {
        format!("{}/api/items", self.base_url)
    }
}

fn transport(err: reqwest::Error) -> ApiFailure {
    ApiFailure {
        kind: None,
        message: err.to_string(),
    }
}

async fn failure(response: reqwest::Response) -> ApiFailure {
    let status = response.status();
    let body = response.json::<ErrorBody>().await.ok();
    let (kind, message) = match body {
        Some(b) => (b.error, b.message),
        None => (None, None),
    };
    ApiFailure {
        kind,
        message: message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    }
}

impl ItemsApi for HttpItemsApi {
    async fn fetch_items(&self) -> Result<Vec<AuctionItem>, ApiFailure> {
        let response = self
            .http
            .get(self.items_url())
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        response.json().await.map_err(transport)
    }

    async fn patch_item(&self, id: &str, payload: &UpdatePayload) -> Result<(), ApiFailure> {
        let response = self
            .http
            .patch(format!("{}/{}", self.items_url(), urlencoding::encode(id)))
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }
}
