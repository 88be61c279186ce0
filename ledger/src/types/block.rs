// ledger/src/types/block.rs

//! Block types and hashing.
//!
//! This module defines the ledger's block record together with the
//! canonical digest function that links blocks into a chain.
//!
//! The digest covers `(index, previous_hash, timestamp, payload)` encoded
//! with **bincode 2** using the `serde` integration and an explicit
//! `standard()` config. That encoding is positional: struct fields are
//! written in declaration order and there are no key maps, so the bytes do
//! not depend on how a JSON encoder happens to order object keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Hash256, Payload};

/// Strongly-typed block hash.
///
/// This is the BLAKE3-256 digest returned by [`digest`]. The all-zero
/// value is reserved as [`BlockHash::SENTINEL`], the `previous_hash` of
/// the genesis block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(pub Hash256);

impl BlockHash {
    /// `previous_hash` of the genesis block; never a real digest.
    pub const SENTINEL: BlockHash = BlockHash(Hash256::ZERO);

    pub fn is_sentinel(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, &'static str> {
        Hash256::from_hex(hex_str).map(BlockHash)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The exact field tuple fed to the digest, in canonical order.
#[derive(Serialize)]
struct DigestInput<'a> {
    index: u64,
    previous_hash: &'a BlockHash,
    timestamp: u64,
    payload: &'a Payload,
}

/// Computes the digest of a block's content fields.
///
/// Pure and deterministic: the same four inputs always give the same hash.
///
/// # Panics
///
/// Panics if encoding fails. This is considered a programming error,
/// because every payload variant is a flat struct of strings, numbers
/// and fixed-size hashes.
pub fn digest(index: u64, previous_hash: &BlockHash, timestamp: u64, payload: &Payload) -> BlockHash {
    let input = DigestInput {
        index,
        previous_hash,
        timestamp,
        payload,
    };
    // Explicit config to avoid relying on any implicit defaults.
    let cfg = bincode::config::standard();
    let bytes = bincode::serde::encode_to_vec(&input, cfg)
        .expect("digest input should always be serializable with bincode 2 + serde");
    BlockHash(Hash256::compute(&bytes))
}

/// One immutable ledger entry.
///
/// The JSON form matches the persisted record layout:
/// `{index, timestamp, payload, previousHash, hash}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain, starting at 0 for genesis.
    pub index: u64,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Business event recorded by this block.
    pub payload: Payload,
    /// Hash of the preceding block, or [`BlockHash::SENTINEL`] for genesis.
    pub previous_hash: BlockHash,
    /// Digest stored at creation time.
    ///
    /// Loading a block never recomputes this field; only verification
    /// compares it against [`Block::compute_hash`].
    pub hash: BlockHash,
}

impl Block {
    /// Builds a block and seals it with its digest.
    pub fn new(index: u64, timestamp: u64, payload: Payload, previous_hash: BlockHash) -> Self {
        let hash = digest(index, &previous_hash, timestamp, &payload);
        Self {
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// Builds block 0.
    pub fn genesis(timestamp: u64) -> Self {
        Self::new(0, timestamp, Payload::Genesis, BlockHash::SENTINEL)
    }

    /// Recomputes the digest from the block's current field values.
    pub fn compute_hash(&self) -> BlockHash {
        digest(self.index, &self.previous_hash, self.timestamp, &self.payload)
    }

    /// Returns `true` if the stored hash matches the recomputed digest.
    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && matches!(self.payload, Payload::Genesis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchId, DigitalPassport, HASH_LEN};

    fn harvest(batch: &str, quantity: f64) -> Payload {
        let qr = format!(r#"{{"batchId":"{batch}"}}"#);
        Payload::HarvestSold {
            batch_id: BatchId::from(batch),
            farmer_id: "farmer-1".to_string(),
            crop: "Groundnut".to_string(),
            harvest_date: "2024-01-10".to_string(),
            quantity,
            digital_passport: DigitalPassport::compute(&qr),
            qr_data_string: qr,
        }
    }

    #[test]
    fn block_hash_is_deterministic() {
        let parent = BlockHash(Hash256([1u8; HASH_LEN]));
        let a = Block::new(1, 1_700_000_000_000, harvest("B1", 12.5), parent);
        let b = Block::new(1, 1_700_000_000_000, harvest("B1", 12.5), parent);

        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash, a.compute_hash());
        assert!(a.has_valid_hash());
    }

    #[test]
    fn every_digest_field_changes_the_hash() {
        let parent = BlockHash(Hash256([1u8; HASH_LEN]));
        let base = Block::new(1, 1_000, harvest("B1", 10.0), parent);

        let other_index = Block::new(2, 1_000, harvest("B1", 10.0), parent);
        let other_parent = Block::new(1, 1_000, harvest("B1", 10.0), BlockHash::SENTINEL);
        let other_time = Block::new(1, 1_001, harvest("B1", 10.0), parent);
        let other_payload = Block::new(1, 1_000, harvest("B1", 10.5), parent);

        for changed in [other_index, other_parent, other_time, other_payload] {
            assert_ne!(changed.hash, base.hash);
        }
    }

    #[test]
    fn editing_a_field_invalidates_stored_hash() {
        let mut block = Block::new(3, 42, harvest("B9", 1.0), BlockHash::SENTINEL);
        block.timestamp += 1;
        assert!(!block.has_valid_hash());
    }

    #[test]
    fn genesis_uses_sentinel_parent() {
        let genesis = Block::genesis(7);
        assert!(genesis.previous_hash.is_sentinel());
        assert!(genesis.is_genesis());
        assert!(!genesis.hash.is_sentinel());
    }

    #[test]
    fn json_record_layout_keeps_stored_hash() {
        let block = Block::new(1, 99, harvest("B1", 3.0), BlockHash::SENTINEL);
        let json = serde_json::to_value(&block).expect("serialize");

        assert_eq!(json["index"], 1);
        assert_eq!(json["payload"]["action"], "HARVEST_SOLD");
        assert_eq!(json["previousHash"], BlockHash::SENTINEL.to_hex());
        assert_eq!(json["hash"], block.hash.to_hex());

        let back: Block = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, block);
    }
}
