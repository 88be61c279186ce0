use std::fmt;

use crate::storage::StorageError;

/// Error type returned when a payload fails boundary validation.
#[derive(Debug)]
pub enum ValidationError {
    /// Payload is invalid according to a validity predicate.
    Invalid(&'static str),
    /// Payload is invalid with a dynamic error message.
    Custom(String),
}

/// High-level errors returned by the ledger service.
#[derive(Debug)]
pub enum LedgerError {
    /// Payload rejected before anything was appended.
    Validation(ValidationError),
    /// Durable write failed; the in-memory append was rolled back.
    Storage(StorageError),
    /// Genesis payloads are only ever created by the bootstrap path.
    GenesisPayload,
    /// The stored tail already carries the largest representable index.
    IndexOverflow(u64),
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        LedgerError::Validation(e)
    }
}

impl From<StorageError> for LedgerError {
    fn from(e: StorageError) -> Self {
        LedgerError::Storage(e)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Invalid(msg) => write!(f, "invalid payload: {msg}"),
            ValidationError::Custom(msg) => write!(f, "invalid payload: {msg}"),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Validation(e) => write!(f, "{e}"),
            LedgerError::Storage(e) => write!(f, "storage error: {e}"),
            LedgerError::GenesisPayload => write!(f, "genesis payload cannot be appended"),
            LedgerError::IndexOverflow(last) => write!(f, "no index left after block {last}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Validation(e) => Some(e),
            LedgerError::Storage(e) => Some(e),
            LedgerError::GenesisPayload | LedgerError::IndexOverflow(_) => None,
        }
    }
}
