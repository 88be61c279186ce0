//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed ledger metrics, and an async HTTP
//! exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use ::prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// Ledger-related Prometheus metrics.
///
/// These are registered into a [`Registry`] and updated by
/// [`crate::chain::TraceLedger`] once attached with `with_metrics`.
#[derive(Clone)]
pub struct LedgerMetrics {
    /// Blocks successfully appended and persisted.
    pub blocks_appended: IntCounter,
    /// Appends rolled back because the durable write failed.
    pub append_failures: IntCounter,
    /// Verifications that found an integrity violation.
    pub verify_failures: IntCounter,
    /// Current number of blocks, genesis included.
    pub chain_length: IntGauge,
    /// Latency of a full append (validate, seal, persist), in seconds.
    pub append_seconds: Histogram,
}

impl LedgerMetrics {
    /// Registers ledger metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, ::prometheus::Error> {
        let blocks_appended = IntCounter::with_opts(Opts::new(
            "ledger_blocks_appended_total",
            "Total number of blocks appended and persisted",
        ))?;
        registry.register(Box::new(blocks_appended.clone()))?;

        let append_failures = IntCounter::with_opts(Opts::new(
            "ledger_append_failures_total",
            "Total number of appends rolled back after a storage failure",
        ))?;
        registry.register(Box::new(append_failures.clone()))?;

        let verify_failures = IntCounter::with_opts(Opts::new(
            "ledger_verify_failures_total",
            "Total number of integrity checks that found a violation",
        ))?;
        registry.register(Box::new(verify_failures.clone()))?;

        let chain_length = IntGauge::with_opts(Opts::new(
            "ledger_chain_length",
            "Number of blocks in the chain, genesis included",
        ))?;
        registry.register(Box::new(chain_length.clone()))?;

        // Dominated by the storage write; whole-file rewrites grow with the chain.
        let append_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "ledger_append_seconds",
                "Time to validate, seal and persist one block in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(append_seconds.clone()))?;

        Ok(Self {
            blocks_appended,
            append_failures,
            verify_failures,
            chain_length,
            append_seconds,
        })
    }
}

/// Wrapper around a Prometheus registry and the ledger metrics.
///
/// This is the main handle you pass around in a binary. It can be wrapped
/// in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub ledger: LedgerMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the ledger metrics.
    pub fn new() -> Result<Self, ::prometheus::Error> {
        let registry = Registry::new_custom(Some("trace".to_string()), None)?;
        let ledger = LedgerMetrics::register(&registry)?;
        Ok(Self { registry, ledger })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves `GET /metrics` with the
/// Prometheus text exposition format. All other paths return 404.
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::warn!(error = %err, "prometheus HTTP server error");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.method(), req.uri().path(), &metrics))
}

fn route(method: &Method, path: &str, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::GET, "/metrics") => {
            let mut resp = Response::new(Full::new(Bytes::from(metrics.gather_text())));
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            resp
        }
        _ => {
            let mut resp = Response::new(Full::new(Bytes::from("not found")));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        }
    }
}
