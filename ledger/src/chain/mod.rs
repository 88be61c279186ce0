//! Ledger core: chain service, storage abstraction, verification and
//! queries.
//!
//! This module provides the pieces of the traceability ledger:
//!
//! - the service object owning the chain ([`service::TraceLedger`]),
//! - the durable store abstraction ([`store::LedgerStorage`]),
//! - payload validity predicates ([`validator::PayloadValidator`]),
//! - the integrity verifier ([`verify::verify_chain`]),
//! - read-side queries ([`query`]).

pub mod error;
pub mod query;
pub mod service;
pub mod store;
pub mod validator;
pub mod verify;

pub use error::{LedgerError, ValidationError};
pub use service::{TraceLedger, current_unix_millis};
pub use store::LedgerStorage;
pub use validator::{AcceptAllValidator, CombinedValidator, PayloadValidator};
pub use verify::{IntegrityViolation, ViolationKind, verify_chain};
