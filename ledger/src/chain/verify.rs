//! Integrity verification.
//!
//! Walks a chain recomputing digests and checking linkage. The walk
//! reports the *first* failing position together with what went wrong, so
//! operators know where tampering starts and tests can assert the exact
//! failure.
//!
//! Checks, in order:
//!
//! 1. genesis: index 0, sentinel parent, digest matches;
//! 2. for every later position `i`: digest matches, parent is not the
//!    sentinel, parent equals the hash at `i - 1`, index equals `i`.

use std::fmt;

use serde::Serialize;

use crate::types::Block;

/// Kind of integrity failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The chain holds no blocks at all.
    EmptyChain,
    /// Stored hash differs from the recomputed digest (content tampering).
    ContentHashMismatch,
    /// `previous_hash` does not match the preceding block's hash
    /// (blocks reordered, removed or inserted).
    LinkageMismatch,
    /// Block index does not equal its position.
    IndexMismatch,
    /// Genesis parent is not the sentinel, or a later block uses it.
    GenesisSentinel,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::EmptyChain => "empty chain",
            ViolationKind::ContentHashMismatch => "hash mismatch",
            ViolationKind::LinkageMismatch => "previous hash mismatch",
            ViolationKind::IndexMismatch => "index mismatch",
            ViolationKind::GenesisSentinel => "genesis sentinel misuse",
        }
    }
}

/// First integrity failure found in a chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct IntegrityViolation {
    /// Position in the chain of the offending block.
    pub index: u64,
    pub kind: ViolationKind,
}

impl IntegrityViolation {
    fn at(index: usize, kind: ViolationKind) -> Self {
        Self {
            index: index as u64,
            kind,
        }
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} invalid: {}", self.index, self.kind.as_str())
    }
}

impl std::error::Error for IntegrityViolation {}

/// Verifies an ordered slice of blocks.
///
/// Works on any slice, so it can audit a chain read straight from storage
/// as well as the live chain held by the ledger service.
pub fn verify_chain(blocks: &[Block]) -> Result<(), IntegrityViolation> {
    let Some(genesis) = blocks.first() else {
        return Err(IntegrityViolation::at(0, ViolationKind::EmptyChain));
    };

    if genesis.index != 0 {
        return Err(IntegrityViolation::at(0, ViolationKind::IndexMismatch));
    }
    if !genesis.previous_hash.is_sentinel() {
        return Err(IntegrityViolation::at(0, ViolationKind::GenesisSentinel));
    }
    if !genesis.has_valid_hash() {
        return Err(IntegrityViolation::at(0, ViolationKind::ContentHashMismatch));
    }

    for (offset, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let position = offset + 1;

        if !current.has_valid_hash() {
            return Err(IntegrityViolation::at(
                position,
                ViolationKind::ContentHashMismatch,
            ));
        }
        if current.previous_hash.is_sentinel() {
            return Err(IntegrityViolation::at(position, ViolationKind::GenesisSentinel));
        }
        if current.previous_hash != previous.hash {
            return Err(IntegrityViolation::at(position, ViolationKind::LinkageMismatch));
        }
        if current.index != position as u64 {
            return Err(IntegrityViolation::at(position, ViolationKind::IndexMismatch));
        }
    }

    Ok(())
}
