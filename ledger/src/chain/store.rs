//! Storage abstraction used by the ledger service.

use crate::storage::StorageError;
use crate::types::Block;

/// Durable home of the chain.
///
/// Implementations can be backed by a JSON file, RocksDB, memory, etc.
/// The interface is intentionally small: the ledger only needs to load the
/// whole chain once at startup and persist it after every append.
pub trait LedgerStorage {
    /// Reads the stored chain.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet (or the store is
    /// empty) and an error when the contents cannot be read or parsed.
    /// Blocks must be returned exactly as stored, hashes included.
    fn load(&mut self) -> Result<Option<Vec<Block>>, StorageError>;

    /// Replaces the stored chain with `blocks`.
    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError>;

    /// Persists a chain whose last element was just appended.
    ///
    /// The default rewrites everything via [`LedgerStorage::save`].
    /// Incremental backends override it to write only the new block.
    fn append(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        self.save(blocks)
    }
}

impl<T: LedgerStorage + ?Sized> LedgerStorage for Box<T> {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        (**self).save(blocks)
    }

    fn append(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        (**self).append(blocks)
    }
}
