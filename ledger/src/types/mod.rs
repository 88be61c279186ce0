//! Core domain types used by the ledger
//!
//! This module defines strongly-typed hashes, batch identifiers, the event
//! payloads recorded on the ledger and the block structure itself. The goal
//! is to avoid "naked" strings and byte buffers in public APIs and instead
//! use domain-specific newtypes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Block structure, canonical digest and genesis construction.
pub mod block;
/// Event payloads appended by the marketplace flows.
pub mod event;
/// QR-code payloads and the digital passport derived from them.
pub mod passport;

pub use block::{Block, BlockHash};
pub use event::{EventKind, Payload};
pub use passport::{DigitalPassport, QrPayload};

/// Length in bytes of all 256-bit hash types used in this module.
pub const HASH_LEN: usize = 32;

/// Strongly-typed 256-bit hash wrapper (BLAKE3-256).
///
/// This type backs every fixed-size digest in the ledger (block hashes,
/// digital passports). It is always exactly [`HASH_LEN`] bytes long.
///
/// Human-readable formats (JSON) carry it as a lowercase hex string; binary
/// formats (the canonical bincode encoding) carry the raw 32 bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; HASH_LEN]);

impl Hash256 {
    /// The all-zero hash. Used as the genesis `previous_hash` sentinel.
    pub const ZERO: Hash256 = Hash256([0u8; HASH_LEN]);

    /// Computes a new [`Hash256`] as the BLAKE3-256 hash of `data`.
    ///
    /// The result is deterministic for a given byte slice and is suitable
    /// for use as an identifier or content hash, but it is **not**
    /// a password hash or KDF.
    pub fn compute(data: &[u8]) -> Self {
        let h = blake3::hash(data);
        Hash256(*h.as_bytes())
    }

    /// Returns the underlying 32-byte hash as a borrowed array.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex rendering of the hash.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string into a [`Hash256`].
    pub fn from_hex(hex_str: &str) -> Result<Self, &'static str> {
        let bytes = hex::decode(hex_str).map_err(|_| "invalid hex encoding")?;
        if bytes.len() != HASH_LEN {
            return Err("expected 32-byte hash");
        }
        let mut arr = [0u8; HASH_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Hash256(arr))
    }

    /// Returns `true` for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Hash256::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_LEN]>::deserialize(deserializer).map(Hash256)
        }
    }
}

/// Business key correlating the events of one produce lot.
///
/// Batch ids are opaque strings. Fresh ids minted by the harvest-sale flow
/// are UUID v4 values (see [`BatchId::generate`]), but the ledger accepts
/// any non-empty string so legacy entries keep their original ids.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl BatchId {
    /// Mints a new random batch id (UUID v4, hyphenated).
    pub fn generate() -> Self {
        BatchId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(s: &str) -> Self {
        BatchId(s.to_string())
    }
}

impl From<String> for BatchId {
    fn from(s: String) -> Self {
        BatchId(s)
    }
}
