//! In-memory ledger store.
//!
//! This implementation is useful for unit tests, benchmarks, and small
//! demos. Clones share the same backing "disk", so a test can keep one
//! handle while the ledger owns another, inspect what was persisted,
//! tamper with it, or make writes fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chain::store::LedgerStorage;
use crate::types::Block;

use super::StorageError;

/// In-memory implementation of [`LedgerStorage`].
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    blocks: Arc<Mutex<Option<Vec<Block>>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryStorage {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored chain, if anything was saved.
    pub fn persisted(&self) -> Option<Vec<Block>> {
        self.lock().clone()
    }

    /// Overwrites the stored chain directly, bypassing the ledger.
    pub fn replace(&self, blocks: Vec<Block>) {
        *self.lock() = Some(blocks);
    }

    /// When set, every write fails with [`StorageError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<Block>>> {
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerStorage for InMemoryStorage {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StorageError> {
        Ok(self.persisted())
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory store set to fail"));
        }
        *self.lock() = Some(blocks.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_roundtrip() {
        let mut store = InMemoryStorage::new();
        assert!(store.load().expect("load").is_none());

        let chain = vec![Block::genesis(1)];
        store.save(&chain).expect("save");

        assert_eq!(store.load().expect("load"), Some(chain));
    }

    #[test]
    fn clones_share_backing_state() {
        let store = InMemoryStorage::new();
        let mut handle = store.clone();

        handle.save(&[Block::genesis(5)]).expect("save");
        assert_eq!(store.persisted().map(|b| b.len()), Some(1));

        store.set_failing(true);
        assert!(matches!(
            handle.save(&[]),
            Err(StorageError::Unavailable(_))
        ));
    }
}
