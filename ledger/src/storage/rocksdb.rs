//! RocksDB-backed ledger store.
//!
//! This implementation persists blocks in a RocksDB instance with a
//! dedicated column family:
//!
//! - `"blocks"`: maps the block index (8 bytes, big-endian) -> JSON block
//!   record.
//!
//! Big-endian keys make RocksDB's byte order equal to chain order, so a
//! forward scan yields the chain. Appends write a single key; only
//! [`LedgerStorage::save`] rewrites the column family.

use std::path::Path;

use ::rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};

use crate::chain::store::LedgerStorage;
use crate::types::Block;

use super::StorageError;

const CF_BLOCKS: &str = "blocks";

/// Configuration for [`RocksDbStorage`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/trace-ledger-db".to_string(),
            create_if_missing: true,
        }
    }
}

/// RocksDB-backed implementation of [`LedgerStorage`].
pub struct RocksDbStorage {
    db: DB,
}

impl RocksDbStorage {
    /// Opens (or creates) a RocksDB-backed store at the configured path.
    ///
    /// The `"default"` column family is also created to keep RocksDB
    /// happy, but it is not currently used.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StorageError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_BLOCKS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db })
    }

    fn cf_blocks(&self) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_BLOCKS)
            .ok_or(StorageError::MissingColumnFamily(CF_BLOCKS))
    }

    fn key(index: u64) -> [u8; 8] {
        index.to_be_bytes()
    }

    fn encode_block(block: &Block) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(block)?)
    }
}

impl LedgerStorage for RocksDbStorage {
    fn load(&mut self) -> Result<Option<Vec<Block>>, StorageError> {
        let cf = self.cf_blocks()?;
        let mut blocks = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            blocks.push(serde_json::from_slice::<Block>(&value)?);
        }
        if blocks.is_empty() {
            return Ok(None);
        }
        Ok(Some(blocks))
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        let cf = self.cf_blocks()?;
        let mut batch = WriteBatch::default();
        batch.delete_range_cf(cf, Self::key(0), Self::key(u64::MAX));
        batch.delete_cf(cf, Self::key(u64::MAX));
        for block in blocks {
            batch.put_cf(cf, Self::key(block.index), Self::encode_block(block)?);
        }
        self.db.write(batch)?;
        Ok(())
    }

    fn append(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        let Some(block) = blocks.last() else {
            return Ok(());
        };
        let cf = self.cf_blocks()?;
        self.db
            .put_cf(cf, Self::key(block.index), Self::encode_block(block)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TraceLedger;
    use crate::types::{BatchId, Payload};
    use tempfile::TempDir;

    fn cfg_in(tmp: &TempDir) -> RocksDbConfig {
        RocksDbConfig {
            path: tmp.path().to_string_lossy().to_string(),
            create_if_missing: true,
        }
    }

    fn shipment(batch: &str) -> Payload {
        Payload::ShipmentCreated {
            batch_id: BatchId::from(batch),
            tracking_id: "TRK-1".to_string(),
            origin: "Nagpur".to_string(),
            destination: "Pune".to_string(),
        }
    }

    #[test]
    fn empty_database_loads_as_none() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut store = RocksDbStorage::open(&cfg_in(&tmp)).expect("open RocksDB");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn append_writes_only_the_tail_and_reloads_in_order() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = RocksDbStorage::open(&cfg_in(&tmp)).expect("open RocksDB");

        let ledger = TraceLedger::open(store).expect("open ledger");
        ledger.append(shipment("B1")).expect("append");
        ledger.append(shipment("B2")).expect("append");
        let before = ledger.all();
        drop(ledger);

        let store = RocksDbStorage::open(&cfg_in(&tmp)).expect("reopen RocksDB");
        let reloaded = TraceLedger::open(store).expect("reopen ledger");
        assert_eq!(reloaded.all(), before);
        assert!(reloaded.is_valid());
    }

    #[test]
    fn save_replaces_previous_contents() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut store = RocksDbStorage::open(&cfg_in(&tmp)).expect("open RocksDB");

        let genesis = Block::genesis(10);
        let b1 = Block::new(1, 11, shipment("B1"), genesis.hash);
        store.save(&[genesis.clone(), b1]).expect("save");
        store.save(std::slice::from_ref(&genesis)).expect("save");

        assert_eq!(store.load().expect("load"), Some(vec![genesis]));
    }

    #[test]
    fn fractional_quantities_keep_their_hash() {
        let tmp = TempDir::new().expect("create temp dir");
        let mut store = RocksDbStorage::open(&cfg_in(&tmp)).expect("open RocksDB");

        let genesis = Block::genesis(10);
        let harvest = Block::new(
            1,
            11,
            Payload::HarvestSold {
                batch_id: BatchId::from("B1"),
                farmer_id: "f-1".to_string(),
                crop: "Soybean".to_string(),
                harvest_date: "2024-10-01".to_string(),
                quantity: 0.002 + 0.1,
                digital_passport: crate::types::DigitalPassport::compute("qr"),
                qr_data_string: "qr".to_string(),
            },
            genesis.hash,
        );
        let chain = vec![genesis, harvest];
        store.save(&chain).expect("save");

        let loaded = store.load().expect("load").expect("chain present");
        assert_eq!(loaded, chain);
        assert!(crate::chain::verify_chain(&loaded).is_ok());
    }
}
