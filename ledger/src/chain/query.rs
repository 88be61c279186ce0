//! Read-side queries over an ordered block slice.
//!
//! All queries are linear scans that preserve append order. A query that
//! matches nothing returns an empty result; that is a normal outcome, not
//! an error.

use crate::types::{Block, BlockHash, EventKind};

/// Blocks whose payload belongs to `batch_id`, in append order.
pub fn trace_history(blocks: &[Block], batch_id: &str) -> Vec<Block> {
    blocks
        .iter()
        .filter(|b| b.payload.is_for_batch(batch_id))
        .cloned()
        .collect()
}

/// Looks up a block by its stored hash.
pub fn find_by_hash(blocks: &[Block], hash: &BlockHash) -> Option<Block> {
    blocks.iter().find(|b| b.hash == *hash).cloned()
}

/// Blocks naming `farmer_id` (harvest sales and legacy trace entries).
pub fn farmer_history(blocks: &[Block], farmer_id: &str) -> Vec<Block> {
    blocks
        .iter()
        .filter(|b| b.payload.farmer_id() == Some(farmer_id))
        .cloned()
        .collect()
}

/// Returns `true` if the farmer has at least one traceable sale or entry.
pub fn has_farmer_activity(blocks: &[Block], farmer_id: &str) -> bool {
    blocks
        .iter()
        .any(|b| b.payload.farmer_id() == Some(farmer_id))
}

/// Event kinds recorded for a batch, in order. Handy for timelines.
pub fn batch_timeline(blocks: &[Block], batch_id: &str) -> Vec<EventKind> {
    blocks
        .iter()
        .filter(|b| b.payload.is_for_batch(batch_id))
        .map(|b| b.payload.kind())
        .collect()
}
