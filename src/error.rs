//! Error types for the item store and its backends.

use thiserror::Error;

/// Failures raised by a sheet backend. The message is passed through to
/// callers unchanged for operator diagnosis.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or TLS failure talking to Google
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Google answered with a non-success status
    #[error("Sheets API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The service-account key could not sign a token
    #[error("could not sign access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Configured worksheet index does not exist
    #[error("sheet index {0} not found")]
    SheetNotFound(usize),

    /// Response did not have the expected shape
    #[error("unexpected response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by [`crate::store::ItemStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials or spreadsheet id are missing.
    #[error(
        "Google Sheets is not configured. Set GOOGLE_SHEETS_SPREADSHEET_ID, \
         GOOGLE_SERVICE_ACCOUNT_EMAIL and GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY."
    )]
    NotConfigured,

    /// Row id is not an integer >= 2.
    #[error("invalid row id: {0} (expected an integer of 2 or more)")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// HTTP status class for this error.
    pub fn status(&self) -> u16 {
        match self {
            StoreError::NotConfigured => 503,
            StoreError::InvalidIdentifier(_) => 400,
            StoreError::Backend(_) => 500,
        }
    }
}
