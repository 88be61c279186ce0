//! Storage backends for the ledger.
//!
//! This module provides concrete implementations of the
//! [`crate::chain::store::LedgerStorage`] trait, including:
//!
//! - an in-memory store ([`mem::InMemoryStorage`]) suitable for tests,
//! - a JSON file store ([`json_file::JsonFileStorage`]) holding the whole
//!   chain as one array, rewritten on every append,
//! - a RocksDB-backed store ([`rocksdb::RocksDbStorage`]) that writes only
//!   the new block on append.

use std::fmt;
use std::io;

use crate::chain::store::LedgerStorage;
use crate::config::{StorageBackend, StorageConfig};

pub mod json_file;
pub mod mem;
pub mod rocksdb;

pub use json_file::JsonFileStorage;
pub use mem::InMemoryStorage;
pub use rocksdb::{RocksDbConfig, RocksDbStorage};

/// Storage-level error type.
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure.
    Io(io::Error),
    /// Stored contents are not a valid block record list.
    Json(serde_json::Error),
    /// Underlying RocksDB error.
    RocksDb(::rocksdb::Error),
    /// Required column family was not found.
    MissingColumnFamily(&'static str),
    /// The backend refused the operation (e.g. a test store set to fail).
    Unavailable(&'static str),
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

impl From<::rocksdb::Error> for StorageError {
    fn from(e: ::rocksdb::Error) -> Self {
        StorageError::RocksDb(e)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "i/o error: {e}"),
            StorageError::Json(e) => write!(f, "malformed ledger record: {e}"),
            StorageError::RocksDb(e) => write!(f, "rocksdb error: {e}"),
            StorageError::MissingColumnFamily(cf) => write!(f, "missing column family '{cf}'"),
            StorageError::Unavailable(why) => write!(f, "storage unavailable: {why}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            StorageError::RocksDb(e) => Some(e),
            _ => None,
        }
    }
}

/// Boxed storage chosen at runtime from configuration.
pub type DynStorage = Box<dyn LedgerStorage + Send>;

/// Opens the backend selected by `cfg`.
pub fn open_configured(cfg: &StorageConfig) -> Result<DynStorage, StorageError> {
    match cfg.backend {
        StorageBackend::JsonFile => Ok(Box::new(JsonFileStorage::new(&cfg.json_path))),
        StorageBackend::RocksDb => Ok(Box::new(RocksDbStorage::open(&cfg.rocksdb)?)),
    }
}
