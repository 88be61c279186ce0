// src/main.rs
//
// Read-only audit tool for a JSON ledger file:
//
// - loads the chain straight from disk (never bootstraps or rewrites it)
// - prints the integrity verdict
// - optionally prints the recorded history of one batch as JSON
//
// Usage: trace-ledger [ledger.json] [batchId]
// Without a path, TRACE_LEDGER_PATH (or the default ledger path) is used.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use trace_ledger::{JsonFileStorage, LedgerConfig, verify_chain};
use trace_ledger::chain::query;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace_ledger=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("fatal error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the ledger verified.
fn run() -> Result<bool, String> {
    let mut args = std::env::args().skip(1);

    let path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => {
            LedgerConfig::from_env()
                .map_err(|e| format!("invalid configuration: {e}"))?
                .storage
                .json_path
        }
    };
    let batch_id = args.next();

    let blocks = JsonFileStorage::new(&path)
        .read_blocks()
        .map_err(|e| format!("failed to read ledger at {}: {e}", path.display()))?
        .ok_or_else(|| format!("no ledger found at {}", path.display()))?;

    tracing::info!(path = %path.display(), blocks = blocks.len(), "loaded ledger");

    let verified = match verify_chain(&blocks) {
        Ok(()) => {
            println!("ledger {}: VERIFIED ({} blocks)", path.display(), blocks.len());
            true
        }
        Err(violation) => {
            println!("ledger {}: COMPROMISED ({violation})", path.display());
            false
        }
    };

    if let Some(batch_id) = batch_id {
        let history = query::trace_history(&blocks, &batch_id);
        if history.is_empty() {
            println!("no history recorded for batch {batch_id}");
        } else {
            let timeline: Vec<_> = query::batch_timeline(&blocks, &batch_id)
                .iter()
                .map(|k| k.as_str())
                .collect();
            println!("batch {batch_id}: {}", timeline.join(" -> "));

            let json = serde_json::to_string_pretty(&history)
                .map_err(|e| format!("failed to render history: {e}"))?;
            println!("{json}");
        }
    }

    Ok(verified)
}
