// src/error.rs
//! Failures crossing the gateway's seams.
//!
//! Content-read paths recover from `Unavailable` locally (degraded
//! payloads, never a hard error to the UI); the auth-required endpoints
//! relay `Rejected` statuses verbatim so a caller can clear a stale
//! credential.

use serde_json::json;
use shuttle_axum::axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required bearer credential was not supplied. No upstream call
    /// is attempted.
    #[error("authorization header required")]
    AuthMissing,

    /// The upstream store answered with a non-2xx status (typically an
    /// expired or garbled credential). Status and body are relayed.
    #[error("upstream rejected the request with status {status}")]
    Rejected { status: u16, body: String },

    /// The upstream store could not be reached or returned a malformed
    /// body.
    #[error("upstream store unavailable: {0}")]
    Unavailable(String),

    /// A single feed item failed transformation; the item is skipped,
    /// never the whole page.
    #[error("malformed feed item: {0}")]
    MalformedItem(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Unavailable(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::AuthMissing => (
                StatusCode::UNAUTHORIZED,
                "Authorization header required".to_string(),
            ),
            Error::Rejected { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            ),
            Error::Unavailable(msg) | Error::MalformedItem(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
