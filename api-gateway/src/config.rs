//! API gateway configuration.
//!
//! This only configures the HTTP listen address. The ledger itself is
//! configured through `trace_ledger::LedgerConfig::from_env()`.

use std::net::SocketAddr;

use trace_ledger::ConfigError;
use trace_ledger::config::parse_value;

/// Configuration for the API gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        // Safe to unwrap: fixed, valid address literal.
        // Bind to all interfaces so a container port mapping (8081→8081) is
        // reachable from the host.
        let addr: SocketAddr = "0.0.0.0:8081"
            .parse()
            .expect("hard-coded API listen address should parse");
        Self { listen_addr: addr }
    }
}

impl ApiConfig {
    /// Defaults, with `TRACE_API_ADDR` overriding the listen address.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("TRACE_API_ADDR") {
            cfg.listen_addr = parse_value("TRACE_API_ADDR", &v)?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_override() {
        let cfg = ApiConfig::from_lookup(|key| {
            (key == "TRACE_API_ADDR").then(|| "127.0.0.1:3000".to_string())
        })
        .expect("valid address");
        assert_eq!(cfg.listen_addr.port(), 3000);

        assert_eq!(ApiConfig::from_lookup(|_| None).unwrap().listen_addr.port(), 8081);
        assert!(ApiConfig::from_lookup(|_| Some("nope".to_string())).is_err());
    }
}
