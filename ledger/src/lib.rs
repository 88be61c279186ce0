//! Produce traceability ledger.
//!
//! This crate provides an append-only, hash-chained record of
//! produce-batch lifecycle events (harvest sold, processed, shipped, trace
//! entries) with tamper detection:
//!
//! - strongly-typed domain types (`types`),
//! - the ledger service, integrity verifier and queries (`chain`),
//! - payload validity predicates (`validation`),
//! - storage backends (`storage`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level ledger configuration (`config`).
//!
//! Higher-level binaries (the HTTP gateway, the audit CLI) compose these
//! pieces around a single shared [`TraceLedger`].

pub mod chain;
pub mod config;
pub mod metrics;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export top-level configuration types.
pub use config::{ConfigError, LedgerConfig, MetricsConfig, StorageBackend, StorageConfig};

// Re-export "core" ledger types and traits.
pub use chain::{
    AcceptAllValidator, CombinedValidator, IntegrityViolation, LedgerError, LedgerStorage,
    PayloadValidator, TraceLedger, ValidationError, ViolationKind, current_unix_millis,
    verify_chain,
};

// Re-export storage backends.
pub use storage::{
    DynStorage, InMemoryStorage, JsonFileStorage, RocksDbConfig, RocksDbStorage, StorageError,
    open_configured,
};

pub use validation::{BasePayloadValidity, DefaultPayloadValidator, PassportValidity, ValidationConfig};

// Re-export metrics registry and ledger metrics.
pub use metrics::{LedgerMetrics, MetricsRegistry, run_prometheus_http_server};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the ledger stack used by the binaries: whichever backend
/// the configuration selects, behind the default payload validator.
pub type DefaultTraceLedger = TraceLedger<DynStorage, DefaultPayloadValidator>;

/// Opens the configured backend and builds a [`DefaultTraceLedger`] whose
/// validator honours `cfg.validation`.
pub fn open_ledger(cfg: &LedgerConfig) -> Result<DefaultTraceLedger, LedgerError> {
    let storage = open_configured(&cfg.storage)?;
    let validator = CombinedValidator::new(
        BasePayloadValidity::new(&cfg.validation),
        PassportValidity,
    );
    TraceLedger::open_with_validator(storage, validator)
}
