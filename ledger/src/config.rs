//! Top-level configuration for a ledger instance.
//!
//! This module aggregates configuration for:
//!
//! - storage (backend choice, JSON ledger path, RocksDB settings),
//! - payload validation limits (`ValidationConfig`),
//! - metrics exporter (enable flag + listen address).
//!
//! Everything has a usable default. Binaries call
//! [`LedgerConfig::from_env`] to apply `TRACE_*` environment overrides on
//! top of the defaults.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage::RocksDbConfig;
use crate::validation::ValidationConfig;

/// Which [`crate::chain::LedgerStorage`] backend to open.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StorageBackend {
    /// Whole chain as one JSON array, rewritten on every append.
    #[default]
    JsonFile,
    /// RocksDB, one key per block, appends write only the new block.
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "json-file" | "file" => Ok(StorageBackend::JsonFile),
            "rocksdb" | "rocks" => Ok(StorageBackend::RocksDb),
            other => Err(ConfigError::Invalid {
                key: "TRACE_LEDGER_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Storage configuration.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Path of the JSON ledger file (used by [`StorageBackend::JsonFile`]).
    pub json_path: PathBuf,
    /// RocksDB settings (used by [`StorageBackend::RocksDb`]).
    pub rocksdb: RocksDbConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::JsonFile,
            json_path: PathBuf::from("data/trace_ledger.json"),
            rocksdb: RocksDbConfig::default(),
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for a ledger instance.
#[derive(Clone, Debug, Default)]
pub struct LedgerConfig {
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
    pub metrics: MetricsConfig,
}

/// A configuration value could not be parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl LedgerConfig {
    /// Defaults overridden by the process environment.
    ///
    /// | variable                   | field                       |
    /// |----------------------------|-----------------------------|
    /// | `TRACE_LEDGER_BACKEND`     | `storage.backend`           |
    /// | `TRACE_LEDGER_PATH`        | `storage.json_path`         |
    /// | `TRACE_LEDGER_DB`          | `storage.rocksdb.path`      |
    /// | `TRACE_MAX_FIELD_LEN`      | `validation.max_field_len`  |
    /// | `TRACE_METRICS_ENABLED`    | `metrics.enabled`           |
    /// | `TRACE_METRICS_ADDR`       | `metrics.listen_addr`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LedgerConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("TRACE_LEDGER_BACKEND") {
            cfg.storage.backend = v.parse()?;
        }
        if let Some(v) = lookup("TRACE_LEDGER_PATH") {
            cfg.storage.json_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("TRACE_LEDGER_DB") {
            cfg.storage.rocksdb.path = v;
        }
        if let Some(v) = lookup("TRACE_MAX_FIELD_LEN") {
            cfg.validation.max_field_len = parse_value("TRACE_MAX_FIELD_LEN", &v)?;
        }
        if let Some(v) = lookup("TRACE_METRICS_ENABLED") {
            cfg.metrics.enabled = parse_value("TRACE_METRICS_ENABLED", &v)?;
        }
        if let Some(v) = lookup("TRACE_METRICS_ADDR") {
            cfg.metrics.listen_addr = parse_value("TRACE_METRICS_ADDR", &v)?;
        }

        Ok(cfg)
    }
}

/// Parses an environment value, reporting the key on failure.
pub fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
