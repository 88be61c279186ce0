//! Event payloads recorded on the ledger.
//!
//! Every block carries exactly one [`Payload`]. The set of payloads is
//! closed: the marketplace flows that append to the ledger (harvest sale,
//! processing, shipment, legacy trace entries) each map to one variant.
//!
//! - `HarvestSold` opens the history of a produce lot,
//! - `Processed` and `ShipmentCreated` extend an existing lot,
//! - `TraceEntry` is the catch-all legacy shape.
//!
//! JSON uses an internally-tagged representation keyed by `"action"`
//! (`{"action": "HARVEST_SOLD", "batchId": ...}`). The canonical bincode
//! encoding used for digests only ever *encodes* payloads; decoding always
//! goes through JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BatchId, DigitalPassport};

/// Payload carried by a single block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    /// Payload of block 0. Carries no business data and no batch id.
    Genesis,

    /// A farmer sold a harvested lot; this is the first event of a batch.
    #[serde(rename_all = "camelCase")]
    HarvestSold {
        batch_id: BatchId,
        farmer_id: String,
        crop: String,
        /// Harvest date as supplied by the producer (ISO-8601 string).
        harvest_date: String,
        /// Quantity sold, in quintals.
        quantity: f64,
        /// Digest of `qr_data_string`.
        digital_passport: DigitalPassport,
        /// The QR-code payload printed on the lot.
        qr_data_string: String,
    },

    /// A processor handled the batch (refining, packing, ...).
    #[serde(rename_all = "camelCase")]
    Processed {
        batch_id: BatchId,
        processor_id: String,
        processing_date: String,
        details: String,
    },

    /// The batch left on a tracked shipment.
    #[serde(rename_all = "camelCase")]
    ShipmentCreated {
        batch_id: BatchId,
        tracking_id: String,
        origin: String,
        destination: String,
    },

    /// Legacy free-form trace entry.
    #[serde(rename_all = "camelCase")]
    TraceEntry {
        batch_id: BatchId,
        farmer_id: String,
        harvest_date: String,
        quality_grade: String,
        processor_id: String,
        current_status: String,
    },
}

/// Discriminant of a [`Payload`], without the data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    Genesis,
    HarvestSold,
    Processed,
    ShipmentCreated,
    TraceEntry,
}

impl EventKind {
    /// Wire name, identical to the JSON `"action"` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Genesis => "GENESIS",
            EventKind::HarvestSold => "HARVEST_SOLD",
            EventKind::Processed => "PROCESSED",
            EventKind::ShipmentCreated => "SHIPMENT_CREATED",
            EventKind::TraceEntry => "TRACE_ENTRY",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Payload {
    pub fn kind(&self) -> EventKind {
        match self {
            Payload::Genesis => EventKind::Genesis,
            Payload::HarvestSold { .. } => EventKind::HarvestSold,
            Payload::Processed { .. } => EventKind::Processed,
            Payload::ShipmentCreated { .. } => EventKind::ShipmentCreated,
            Payload::TraceEntry { .. } => EventKind::TraceEntry,
        }
    }

    /// Batch this event belongs to. `None` only for the genesis payload.
    pub fn batch_id(&self) -> Option<&BatchId> {
        match self {
            Payload::Genesis => None,
            Payload::HarvestSold { batch_id, .. }
            | Payload::Processed { batch_id, .. }
            | Payload::ShipmentCreated { batch_id, .. }
            | Payload::TraceEntry { batch_id, .. } => Some(batch_id),
        }
    }

    /// Farmer named by the event, for the variants that carry one.
    pub fn farmer_id(&self) -> Option<&str> {
        match self {
            Payload::HarvestSold { farmer_id, .. } | Payload::TraceEntry { farmer_id, .. } => {
                Some(farmer_id)
            }
            _ => None,
        }
    }

    /// Returns `true` if this payload belongs to `batch_id`.
    pub fn is_for_batch(&self, batch_id: &str) -> bool {
        self.batch_id().is_some_and(|b| b.as_str() == batch_id)
    }

    /// All free-text fields of the payload, for length checks.
    pub(crate) fn text_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Payload::Genesis => Vec::new(),
            Payload::HarvestSold {
                batch_id,
                farmer_id,
                crop,
                harvest_date,
                qr_data_string,
                ..
            } => vec![
                ("batchId", batch_id.as_str()),
                ("farmerId", farmer_id),
                ("crop", crop),
                ("harvestDate", harvest_date),
                ("qrDataString", qr_data_string),
            ],
            Payload::Processed {
                batch_id,
                processor_id,
                processing_date,
                details,
            } => vec![
                ("batchId", batch_id.as_str()),
                ("processorId", processor_id),
                ("processingDate", processing_date),
                ("details", details),
            ],
            Payload::ShipmentCreated {
                batch_id,
                tracking_id,
                origin,
                destination,
            } => vec![
                ("batchId", batch_id.as_str()),
                ("trackingId", tracking_id),
                ("origin", origin),
                ("destination", destination),
            ],
            Payload::TraceEntry {
                batch_id,
                farmer_id,
                harvest_date,
                quality_grade,
                processor_id,
                current_status,
            } => vec![
                ("batchId", batch_id.as_str()),
                ("farmerId", farmer_id),
                ("harvestDate", harvest_date),
                ("qualityGrade", quality_grade),
                ("processorId", processor_id),
                ("currentStatus", current_status),
            ],
        }
    }
}
