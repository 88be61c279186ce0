//! Flat-file JSON ledger store.
//!
//! The whole chain lives in one pretty-printed JSON array of block records
//! (`index, timestamp, payload, previousHash, hash`). Every save rewrites
//! the file: the new contents go to a sibling temp file which is then
//! renamed over the old one, so a crash mid-write leaves either the old or
//! the new chain on disk, never a truncated mix.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::chain::store::LedgerStorage;
use crate::types::Block;

use super::StorageError;

/// JSON-file implementation of [`LedgerStorage`].
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the file without going through a ledger, e.g. for audits.
    pub fn read_blocks(&self) -> Result<Option<Vec<Block>>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let blocks: Vec<Block> = serde_json::from_str(&raw)?;
        Ok(Some(blocks))
    }
}

impl LedgerStorage for JsonFileStorage {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StorageError> {
        self.read_blocks()
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(blocks)?;
        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        // Contents must be on disk before the rename makes them visible.
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
