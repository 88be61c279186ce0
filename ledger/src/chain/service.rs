//! The ledger service.
//!
//! [`TraceLedger`] owns the in-memory chain and its durable store. It is
//! built once by the application's composition root and shared by handle
//! (`Arc<TraceLedger<..>>`) with every producer and reader.
//!
//! Concurrency: the chain sits behind an [`RwLock`]. [`TraceLedger::append`]
//! holds the write guard across read-latest, digest, push and persist, so
//! concurrent writers are serialized and can never build on the same
//! parent. Readers share the read guard and never observe a half-finished
//! append.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::metrics::LedgerMetrics;
use crate::types::{Block, BlockHash, Payload};
use crate::validation::DefaultPayloadValidator;

use super::error::LedgerError;
use super::query;
use super::store::LedgerStorage;
use super::validator::PayloadValidator;
use super::verify::{IntegrityViolation, verify_chain};

/// Append-only, hash-chained ledger of produce-batch events.
///
/// This struct is generic over:
///
/// - `S`: durable backend implementing [`LedgerStorage`],
/// - `V`: boundary checks implementing [`PayloadValidator`].
pub struct TraceLedger<S, V = DefaultPayloadValidator> {
    blocks: RwLock<Vec<Block>>,
    storage: Mutex<S>,
    validator: V,
    metrics: Option<LedgerMetrics>,
}

impl<S: LedgerStorage> TraceLedger<S> {
    /// Opens the ledger with the default payload validator.
    pub fn open(storage: S) -> Result<Self, LedgerError> {
        Self::open_with_validator(storage, DefaultPayloadValidator::default())
    }
}

impl<S, V> TraceLedger<S, V>
where
    S: LedgerStorage,
    V: PayloadValidator,
{
    /// Opens the ledger from `storage`, bootstrapping a genesis chain when
    /// the store is absent, empty or unreadable.
    ///
    /// Stored blocks are trusted as-is: hashes are kept verbatim and no
    /// verification runs here. Call [`TraceLedger::verify`] to audit.
    pub fn open_with_validator(mut storage: S, validator: V) -> Result<Self, LedgerError> {
        let loaded = match storage.load() {
            Ok(Some(blocks)) if !blocks.is_empty() => Some(blocks),
            Ok(_) => {
                tracing::info!("no stored ledger found, initialising genesis block");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load ledger, starting fresh");
                None
            }
        };

        let blocks = match loaded {
            Some(blocks) => {
                if !blocks[0].previous_hash.is_sentinel() {
                    tracing::warn!("stored genesis block does not carry the sentinel parent hash");
                }
                tracing::info!(blocks = blocks.len(), "loaded ledger");
                blocks
            }
            None => {
                let genesis = vec![Block::genesis(current_unix_millis())];
                storage.save(&genesis)?;
                genesis
            }
        };

        Ok(Self {
            blocks: RwLock::new(blocks),
            storage: Mutex::new(storage),
            validator,
            metrics: None,
        })
    }

    /// Attaches Prometheus metrics that are updated on every append and
    /// verification.
    pub fn with_metrics(mut self, metrics: LedgerMetrics) -> Self {
        metrics.chain_length.set(self.len() as i64);
        self.metrics = Some(metrics);
        self
    }

    /// Seals `payload` into a new block, appends it and persists the chain.
    ///
    /// On a storage failure the in-memory append is rolled back, so memory
    /// and the durable store never diverge, and the error is returned.
    pub fn append(&self, payload: Payload) -> Result<Block, LedgerError> {
        let start = Instant::now();

        if matches!(payload, Payload::Genesis) {
            return Err(LedgerError::GenesisPayload);
        }
        self.validator.validate(&payload)?;

        let mut blocks = self.write_blocks();
        let latest = last_block(&blocks);
        // Clock steps backwards must not make timestamps decrease.
        let timestamp = current_unix_millis().max(latest.timestamp);
        let index = latest
            .index
            .checked_add(1)
            .ok_or(LedgerError::IndexOverflow(latest.index))?;
        let block = Block::new(index, timestamp, payload, latest.hash);

        blocks.push(block.clone());
        if let Err(e) = self.lock_storage().append(&blocks) {
            blocks.pop();
            tracing::error!(index = block.index, error = %e, "failed to persist block, append rolled back");
            if let Some(m) = &self.metrics {
                m.append_failures.inc();
            }
            return Err(LedgerError::Storage(e));
        }

        if let Some(m) = &self.metrics {
            m.blocks_appended.inc();
            m.chain_length.set(blocks.len() as i64);
            m.append_seconds.observe(start.elapsed().as_secs_f64());
        }
        tracing::debug!(
            index = block.index,
            hash = %block.hash,
            kind = %block.payload.kind(),
            "appended block"
        );

        Ok(block)
    }

    /// Returns the last block (genesis for a fresh ledger).
    pub fn latest(&self) -> Block {
        last_block(&self.read_blocks()).clone()
    }

    /// Snapshot of the whole chain in append order.
    pub fn all(&self) -> Vec<Block> {
        self.read_blocks().clone()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.read_blocks().len()
    }

    /// Always `false` once opened; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.read_blocks().is_empty()
    }

    /// Audits the whole chain, returning the first violation found.
    pub fn verify(&self) -> Result<(), IntegrityViolation> {
        self.audit(&self.read_blocks())
    }

    /// Verifies the chain and reports its length, both taken from the same
    /// snapshot.
    pub fn verify_with_len(&self) -> (usize, Result<(), IntegrityViolation>) {
        let blocks = self.read_blocks();
        (blocks.len(), self.audit(&blocks))
    }

    fn audit(&self, blocks: &[Block]) -> Result<(), IntegrityViolation> {
        let result = verify_chain(blocks);
        if let Err(v) = &result {
            tracing::warn!(index = v.index, kind = v.kind.as_str(), "ledger integrity check failed");
            if let Some(m) = &self.metrics {
                m.verify_failures.inc();
            }
        }
        result
    }

    /// Boolean form of [`TraceLedger::verify`].
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// All blocks recorded for `batch_id`, in append order.
    pub fn trace_history(&self, batch_id: &str) -> Vec<Block> {
        query::trace_history(&self.read_blocks(), batch_id)
    }

    pub fn find_by_hash(&self, hash: &BlockHash) -> Option<Block> {
        query::find_by_hash(&self.read_blocks(), hash)
    }

    pub fn farmer_history(&self, farmer_id: &str) -> Vec<Block> {
        query::farmer_history(&self.read_blocks(), farmer_id)
    }

    /// Used by credit scoring: has this farmer made any traceable sale?
    pub fn has_farmer_activity(&self, farmer_id: &str) -> bool {
        query::has_farmer_activity(&self.read_blocks(), farmer_id)
    }

    // The chain is only mutated by push/pop under the write guard, so a
    // panic elsewhere cannot leave it half-updated.
    fn read_blocks(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_blocks(&self) -> RwLockWriteGuard<'_, Vec<Block>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_storage(&self) -> MutexGuard<'_, S> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn last_block(blocks: &[Block]) -> &Block {
    blocks
        .last()
        .expect("ledger always holds at least the genesis block")
}

/// Returns the current wall-clock time as milliseconds since Unix epoch.
///
/// On error (system clock before epoch) this falls back to 0.
pub fn current_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::chain::validator::AcceptAllValidator;
    use crate::chain::verify::ViolationKind;
    use crate::storage::{InMemoryStorage, JsonFileStorage};
    use crate::types::{BatchId, EventKind, QrPayload};

    fn harvest(batch: &str, farmer: &str, quantity: f64) -> Payload {
        let qr = QrPayload {
            farmer_id: farmer.to_string(),
            crop: "Mustard".to_string(),
            harvest_date: "2024-02-14".to_string(),
            batch_id: BatchId::from(batch),
        };
        Payload::HarvestSold {
            batch_id: BatchId::from(batch),
            farmer_id: farmer.to_string(),
            crop: qr.crop.clone(),
            harvest_date: qr.harvest_date.clone(),
            quantity,
            digital_passport: qr.passport(),
            qr_data_string: qr.to_qr_string(),
        }
    }

    fn processed(batch: &str) -> Payload {
        Payload::Processed {
            batch_id: BatchId::from(batch),
            processor_id: "mill-3".to_string(),
            processing_date: "2024-02-20".to_string(),
            details: "Refined".to_string(),
        }
    }

    /// Scenario A: B1 harvest, B1 processed, B2 harvest.
    fn scenario_a<S: LedgerStorage>(ledger: &TraceLedger<S>) -> (Block, Block, Block) {
        let a = ledger.append(harvest("B1", "farmer-1", 25.37)).expect("append A");
        let b = ledger.append(processed("B1")).expect("append B");
        let c = ledger.append(harvest("B2", "farmer-2", 0.002 + 0.1)).expect("append C");
        (a, b, c)
    }

    fn assert_invariants(blocks: &[Block]) {
        assert!(blocks[0].previous_hash.is_sentinel());
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i as u64);
            assert!(block.has_valid_hash());
            if i > 0 {
                assert_eq!(block.previous_hash, blocks[i - 1].hash);
                assert!(!block.previous_hash.is_sentinel());
            }
        }
    }

    #[test]
    fn fresh_ledger_holds_only_genesis() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");

        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_empty());
        assert!(ledger.latest().is_genesis());
        assert_eq!(disk.persisted().map(|b| b.len()), Some(1));
        assert!(ledger.is_valid());
    }

    #[test]
    fn appends_satisfy_chain_invariants() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        let (_, _, c) = scenario_a(&ledger);

        let blocks = ledger.all();
        assert_eq!(blocks.len(), 4);
        assert_invariants(&blocks);
        assert_eq!(ledger.latest(), c);
        assert_eq!(ledger.verify(), Ok(()));
    }

    #[test]
    fn scenario_a_trace_history() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        let (a, b, c) = scenario_a(&ledger);

        assert_eq!(ledger.trace_history("B1"), vec![a, b]);
        assert_eq!(ledger.trace_history("B2"), vec![c]);
        assert!(ledger.trace_history("B3").is_empty());
    }

    #[test]
    fn every_append_is_persisted() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        scenario_a(&ledger);

        assert_eq!(disk.persisted(), Some(ledger.all()));
    }

    #[test]
    fn genesis_payload_cannot_be_appended() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        let err = ledger.append(Payload::Genesis).unwrap_err();
        assert!(matches!(err, LedgerError::GenesisPayload));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn invalid_payload_is_rejected_before_append() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        let err = ledger.append(processed("")).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn accept_all_validator_admits_blank_batch() {
        let ledger = TraceLedger::open_with_validator(InMemoryStorage::new(), AcceptAllValidator)
            .expect("open");
        ledger.append(processed("")).expect("append");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn storage_failure_rolls_back_append() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        ledger.append(processed("B1")).expect("append");

        disk.set_failing(true);
        let err = ledger.append(processed("B1")).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(ledger.len(), 2);

        disk.set_failing(false);
        let next = ledger.append(processed("B1")).expect("append after recovery");
        assert_eq!(next.index, 2);
        assert_eq!(disk.persisted(), Some(ledger.all()));
        assert!(ledger.is_valid());
    }

    #[test]
    fn reopen_keeps_chain_and_continues_it() {
        let disk = InMemoryStorage::new();
        let first = TraceLedger::open(disk.clone()).expect("open");
        let (_, _, c) = scenario_a(&first);
        drop(first);

        let reopened = TraceLedger::open(disk.clone()).expect("reopen");
        assert_eq!(reopened.latest(), c);

        let d = reopened.append(processed("B2")).expect("append");
        assert_eq!(d.index, 4);
        assert_eq!(d.previous_hash, c.hash);
        assert!(reopened.is_valid());
    }

    #[test]
    fn scenario_b_tampered_field_fails_verification() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        scenario_a(&ledger);
        drop(ledger);

        // Edit block B's details in the store without resealing it.
        let mut stored = disk.persisted().expect("stored chain");
        if let Payload::Processed { details, .. } = &mut stored[2].payload {
            *details = "Adulterated".to_string();
        }
        disk.replace(stored);

        let reloaded = TraceLedger::open(disk).expect("reload");
        assert!(!reloaded.is_valid());
        assert_eq!(
            reloaded.verify().unwrap_err(),
            IntegrityViolation {
                index: 2,
                kind: ViolationKind::ContentHashMismatch,
            }
        );
    }

    #[test]
    fn scenario_c_swapped_blocks_fail_linkage() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        scenario_a(&ledger);
        drop(ledger);

        let mut stored = disk.persisted().expect("stored chain");
        stored.swap(2, 3);
        disk.replace(stored);

        let reloaded = TraceLedger::open(disk).expect("reload");
        let violation = reloaded.verify().unwrap_err();
        assert_eq!(violation.index, 2);
        assert_eq!(violation.kind, ViolationKind::LinkageMismatch);
    }

    #[test]
    fn tampering_any_non_genesis_field_is_detected() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        scenario_a(&ledger);
        let pristine = disk.persisted().expect("stored chain");

        let edits: Vec<Box<dyn Fn(&mut Block)>> = vec![
            Box::new(|b| b.index += 10),
            Box::new(|b| b.timestamp += 1),
            Box::new(|b| b.previous_hash = b.hash),
            Box::new(|b| b.hash = BlockHash(crate::types::Hash256([7; 32]))),
            Box::new(|b| b.payload = processed("B9")),
        ];

        for edit in &edits {
            for position in 1..pristine.len() {
                let mut tampered = pristine.clone();
                edit(&mut tampered[position]);
                disk.replace(tampered);

                let reloaded = TraceLedger::open(disk.clone()).expect("reload");
                assert!(!reloaded.is_valid(), "edit at {position} went unnoticed");
            }
        }
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 25;

        let ledger = Arc::new(TraceLedger::open(InMemoryStorage::new()).expect("open"));

        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for _ in 0..PER_WRITER {
                        ledger
                            .append(processed(&format!("W{w}")))
                            .expect("concurrent append");
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("writer thread panicked");
        }

        let blocks = ledger.all();
        assert_eq!(blocks.len(), WRITERS * PER_WRITER + 1);
        assert_invariants(&blocks);
        assert!(ledger.is_valid());
        for w in 0..WRITERS {
            assert_eq!(ledger.trace_history(&format!("W{w}")).len(), PER_WRITER);
        }
    }

    #[test]
    fn farmer_queries_and_hash_lookup() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        let (a, _, _) = scenario_a(&ledger);

        assert!(ledger.has_farmer_activity("farmer-1"));
        assert!(!ledger.has_farmer_activity("farmer-9"));
        assert_eq!(ledger.farmer_history("farmer-2").len(), 1);
        assert_eq!(ledger.find_by_hash(&a.hash), Some(a));
    }

    #[test]
    fn timestamps_never_decrease() {
        let ledger = TraceLedger::open(InMemoryStorage::new()).expect("open");
        scenario_a(&ledger);
        let blocks = ledger.all();
        assert!(blocks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(blocks[1].payload.kind(), EventKind::HarvestSold);
    }

    #[test]
    fn json_file_round_trip_and_corrupt_file_recovery() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("trace_ledger.json");

        let ledger = TraceLedger::open(JsonFileStorage::new(&path)).expect("open");
        scenario_a(&ledger);
        let before = ledger.all();
        drop(ledger);

        let reloaded = TraceLedger::open(JsonFileStorage::new(&path)).expect("reload");
        assert_eq!(reloaded.all(), before);
        assert!(reloaded.is_valid());
        drop(reloaded);

        std::fs::write(&path, b"{ not json").expect("corrupt file");
        let healed = TraceLedger::open(JsonFileStorage::new(&path)).expect("self-heal");
        assert_eq!(healed.len(), 1);
        assert!(healed.latest().is_genesis());

        let on_disk = std::fs::read_to_string(&path).expect("read back");
        assert!(on_disk.contains("GENESIS"));
    }

    #[test]
    fn verify_with_len_reports_the_audited_snapshot() {
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone()).expect("open");
        scenario_a(&ledger);
        assert_eq!(ledger.verify_with_len(), (4, Ok(())));

        let mut stored = disk.persisted().expect("stored chain");
        stored.truncate(3);
        stored[2].timestamp += 1;
        disk.replace(stored);

        let reloaded = TraceLedger::open(disk).expect("reload");
        let (len, result) = reloaded.verify_with_len();
        assert_eq!(len, 3);
        assert_eq!(result.unwrap_err().kind, ViolationKind::ContentHashMismatch);
    }

    #[test]
    fn fractional_quantities_survive_json_reload() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("trace_ledger.json");

        let ledger = TraceLedger::open(JsonFileStorage::new(&path)).expect("open");
        for quantity in [0.002 + 0.1, 25.37, 1.0 / 3.0, 1e-7, 123_456.789] {
            ledger.append(harvest("B7", "farmer-7", quantity)).expect("append");
        }
        let before = ledger.all();
        drop(ledger);

        let reloaded = TraceLedger::open(JsonFileStorage::new(&path)).expect("reload");
        assert_eq!(reloaded.all(), before);
        assert!(reloaded.is_valid());
    }

    #[test]
    fn append_after_max_index_is_refused() {
        let disk = InMemoryStorage::new();
        let genesis = Block::genesis(1_000);
        let tail = Block::new(u64::MAX, 2_000, processed("B1"), genesis.hash);
        disk.replace(vec![genesis, tail]);

        let ledger = TraceLedger::open(disk.clone()).expect("open");
        let err = ledger.append(processed("B1")).unwrap_err();
        assert!(matches!(err, LedgerError::IndexOverflow(u64::MAX)));
        assert_eq!(ledger.len(), 2);
        assert_eq!(disk.persisted().map(|b| b.len()), Some(2));
    }

    #[test]
    fn metrics_track_appends_and_failures() {
        let registry = crate::metrics::MetricsRegistry::new().expect("registry");
        let disk = InMemoryStorage::new();
        let ledger = TraceLedger::open(disk.clone())
            .expect("open")
            .with_metrics(registry.ledger.clone());

        ledger.append(processed("B1")).expect("append");
        disk.set_failing(true);
        let _ = ledger.append(processed("B1"));

        assert_eq!(registry.ledger.blocks_appended.get(), 1);
        assert_eq!(registry.ledger.append_failures.get(), 1);
        assert_eq!(registry.ledger.chain_length.get(), 2);
    }
}
