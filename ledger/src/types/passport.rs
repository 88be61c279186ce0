//! QR-code payloads and digital passports.
//!
//! When a farmer sells a lot, the marketplace prints a QR code whose
//! content is a small JSON document ([`QrPayload`]). The ledger records a
//! digest of that exact string as the lot's [`DigitalPassport`], so a
//! buyer scanning the code can recompute the digest and compare it with
//! the `HARVEST_SOLD` block.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BatchId, Hash256};

/// Content of the QR code attached to a produce lot.
///
/// Field order is fixed by the struct declaration, so
/// [`QrPayload::to_qr_string`] always yields the same string for the same
/// values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub farmer_id: String,
    pub crop: String,
    pub harvest_date: String,
    pub batch_id: BatchId,
}

impl QrPayload {
    /// Renders the compact JSON string encoded into the QR code.
    pub fn to_qr_string(&self) -> String {
        // Plain strings and a newtype over String always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Computes the passport for this payload's QR string.
    pub fn passport(&self) -> DigitalPassport {
        DigitalPassport::compute(&self.to_qr_string())
    }
}

/// Digest of a QR-code payload string (BLAKE3-256, hex in JSON).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigitalPassport(pub Hash256);

impl DigitalPassport {
    pub fn compute(qr_data: &str) -> Self {
        DigitalPassport(Hash256::compute(qr_data.as_bytes()))
    }

    /// Returns `true` if `qr_data` hashes to this passport.
    pub fn matches(&self, qr_data: &str) -> bool {
        Self::compute(qr_data) == *self
    }

    pub fn as_hash(&self) -> &Hash256 {
        &self.0
    }
}

impl fmt::Display for DigitalPassport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
