//! HTTP route handlers and the error mapping they share.

pub mod health;
pub mod ledger;
pub mod trace;

use axum::{Json, http::StatusCode};
use serde::Serialize;

use trace_ledger::LedgerError;

/// Body of every error response, and of plain acknowledgements.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

/// Error half of every handler's result.
pub type ApiError = (StatusCode, Json<MessageResponse>);

pub fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse { msg: msg.into() }),
    )
}

pub fn not_found(msg: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(MessageResponse { msg: msg.into() }))
}

pub fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse {
            msg: "Server Error".to_string(),
        }),
    )
}

/// Validation failures are the caller's fault (400); anything else is ours.
pub fn ledger_error(err: LedgerError) -> ApiError {
    match err {
        LedgerError::Validation(e) => bad_request(e.to_string()),
        LedgerError::GenesisPayload => bad_request(err.to_string()),
        LedgerError::Storage(_) | LedgerError::IndexOverflow(_) => {
            tracing::error!(error = %err, "ledger append failed");
            internal_error()
        }
    }
}
