//! Shared application state.

use std::sync::Arc;

use trace_ledger::{Block, DefaultTraceLedger, Payload};

use crate::routes::{ApiError, internal_error, ledger_error};

/// Shared state held by the API handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The one ledger instance for this process.
    pub ledger: Arc<DefaultTraceLedger>,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(ledger: DefaultTraceLedger) -> SharedState {
        Arc::new(Self {
            ledger: Arc::new(ledger),
        })
    }

    /// Runs `f` against the ledger on the blocking pool.
    ///
    /// Every ledger call takes a `std::sync` lock that an in-flight append
    /// holds across a storage write, and verification rehashes the whole
    /// chain, so none of them may run on a runtime worker.
    pub async fn with_ledger<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&DefaultTraceLedger) -> T + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        tokio::task::spawn_blocking(move || f(&ledger))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "ledger task failed");
                internal_error()
            })
    }

    pub async fn append(&self, payload: Payload) -> Result<Block, ApiError> {
        self.with_ledger(move |ledger| ledger.append(payload))
            .await?
            .map_err(ledger_error)
    }
}

#[cfg(test)]
pub(crate) fn temp_state(dir: &std::path::Path) -> SharedState {
    let storage: trace_ledger::DynStorage =
        Box::new(trace_ledger::JsonFileStorage::new(dir.join("trace_ledger.json")));
    let ledger = trace_ledger::TraceLedger::open(storage).expect("open ledger");
    AppState::new(ledger)
}
