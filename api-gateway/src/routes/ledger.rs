//! Whole-ledger audit endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use trace_ledger::{Block, BlockHash, IntegrityViolation};

use super::trace::integrity_label;
use super::{ApiError, bad_request, not_found};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub ledger_integrity: &'static str,
    pub length: usize,
    /// First failing position, when the chain does not verify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<IntegrityViolation>,
}

/// `GET /ledger/verify`
///
/// `length` is the length of the chain that was verified.
pub async fn verify(State(state): State<SharedState>) -> Result<Json<VerifyResponse>, ApiError> {
    let (length, result) = state.with_ledger(|ledger| ledger.verify_with_len()).await?;
    let violation = result.err();
    Ok(Json(VerifyResponse {
        ledger_integrity: integrity_label(violation.is_none()),
        length,
        violation,
    }))
}

/// `GET /ledger/block/{hash}`
///
/// Looks a block up by its hex hash. Malformed hashes are a 400.
pub async fn block_by_hash(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<Json<Block>, ApiError> {
    let hash = BlockHash::from_hex(&hash).map_err(bad_request)?;
    state
        .with_ledger(move |ledger| ledger.find_by_hash(&hash))
        .await?
        .map(Json)
        .ok_or_else(|| not_found("No block with this hash"))
}
