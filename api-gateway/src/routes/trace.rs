//! Marketplace flows that append to the ledger, and the batch trace view.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use trace_ledger::{BatchId, Block, DigitalPassport, Payload, QrPayload};

use super::{ApiError, not_found};
use crate::state::SharedState;

/// Request body for `POST /trace/sell`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub farmer_id: String,
    pub crop: String,
    /// Left empty when the farmer does not supply it.
    #[serde(default)]
    pub harvest_date: Option<String>,
    pub quantity: f64,
}

/// Response body for `POST /trace/sell`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellResponse {
    pub msg: &'static str,
    pub batch_id: BatchId,
    pub qr_code_string: String,
    pub digital_passport: DigitalPassport,
    pub block_index: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub batch_id: String,
    pub processor_id: String,
    pub processing_date: String,
    pub details: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub batch_id: String,
    pub tracking_id: String,
    pub origin: String,
    pub destination: String,
}

/// Request body for the legacy `POST /trace/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntryRequest {
    pub batch_id: String,
    pub farmer_id: String,
    pub harvest_date: String,
    pub quality_grade: String,
    pub processor_id: String,
    pub current_status: String,
}

/// Acknowledgement carrying the sealed block.
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub msg: &'static str,
    pub block: Block,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub batch_id: String,
    /// `VERIFIED` or `COMPROMISED`, for the whole chain.
    pub ledger_integrity: &'static str,
    pub history: Vec<Block>,
}

/// `POST /trace/sell`
///
/// Opens a new batch: generates its id, the QR-code string printed on the
/// lot and the passport derived from it, and records `HARVEST_SOLD`.
pub async fn sell(
    State(state): State<SharedState>,
    Json(body): Json<SellRequest>,
) -> Result<Json<SellResponse>, ApiError> {
    let batch_id = BatchId::generate();
    let qr = QrPayload {
        farmer_id: body.farmer_id,
        crop: body.crop,
        harvest_date: body.harvest_date.unwrap_or_default(),
        batch_id: batch_id.clone(),
    };
    let qr_code_string = qr.to_qr_string();
    let digital_passport = DigitalPassport::compute(&qr_code_string);

    let block = state
        .append(Payload::HarvestSold {
            batch_id: batch_id.clone(),
            farmer_id: qr.farmer_id,
            crop: qr.crop,
            harvest_date: qr.harvest_date,
            quantity: body.quantity,
            digital_passport,
            qr_data_string: qr_code_string.clone(),
        })
        .await?;

    tracing::info!(batch_id = %batch_id, index = block.index, "batch created");

    Ok(Json(SellResponse {
        msg: "Batch created successfully",
        batch_id,
        qr_code_string,
        digital_passport,
        block_index: block.index,
    }))
}

/// `POST /trace/process`
pub async fn process(
    State(state): State<SharedState>,
    Json(body): Json<ProcessRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let block = state
        .append(Payload::Processed {
            batch_id: BatchId::from(body.batch_id),
            processor_id: body.processor_id,
            processing_date: body.processing_date,
            details: body.details,
        })
        .await?;

    Ok(Json(BlockResponse {
        msg: "Processing data appended to chain",
        block,
    }))
}

/// `POST /trace/shipment`
pub async fn shipment(
    State(state): State<SharedState>,
    Json(body): Json<ShipmentRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let block = state
        .append(Payload::ShipmentCreated {
            batch_id: BatchId::from(body.batch_id),
            tracking_id: body.tracking_id,
            origin: body.origin,
            destination: body.destination,
        })
        .await?;

    Ok(Json(BlockResponse {
        msg: "Shipment recorded on chain",
        block,
    }))
}

/// `POST /trace/add`
pub async fn add_entry(
    State(state): State<SharedState>,
    Json(body): Json<TraceEntryRequest>,
) -> Result<Json<BlockResponse>, ApiError> {
    let block = state
        .append(Payload::TraceEntry {
            batch_id: BatchId::from(body.batch_id),
            farmer_id: body.farmer_id,
            harvest_date: body.harvest_date,
            quality_grade: body.quality_grade,
            processor_id: body.processor_id,
            current_status: body.current_status,
        })
        .await?;

    Ok(Json(BlockResponse {
        msg: "Block added to chain successfully",
        block,
    }))
}

/// `GET /trace/track/{batch_id}`
///
/// Verifies the whole chain, then returns the batch history. An unknown
/// batch is a 404, regardless of the integrity verdict.
pub async fn track(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
) -> Result<Json<TrackResponse>, ApiError> {
    let (verified, history) = {
        let batch_id = batch_id.clone();
        state
            .with_ledger(move |ledger| (ledger.is_valid(), ledger.trace_history(&batch_id)))
            .await?
    };

    if history.is_empty() {
        return Err(not_found("No history found for this Batch ID"));
    }

    Ok(Json(TrackResponse {
        batch_id,
        ledger_integrity: integrity_label(verified),
        history,
    }))
}

pub(crate) fn integrity_label(verified: bool) -> &'static str {
    if verified { "VERIFIED" } else { "COMPROMISED" }
}
