//! Prometheus metrics registry for the node dashboard.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and hand it to
//! the gateway. `render()` produces the text exposition format.

use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry,
};

/// All gateway-level Prometheus metrics.
pub struct AppMetrics {
    /// RPC calls that went to the node, labelled by method.
    pub rpc_calls_total: CounterVec,
    /// Failed RPC calls, labelled by method.
    pub rpc_failures_total: CounterVec,
    /// Calls served from the cache store.
    pub cache_hits_total: Counter,
    /// Calls that missed or found a stale entry.
    pub cache_misses_total: Counter,
    /// Node round-trip latency in seconds.
    pub rpc_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let rpc_calls_total = CounterVec::new(
            Opts::new("node_dashboard_rpc_calls_total", "RPC calls sent to the node"),
            &["method"],
        )?;

        let rpc_failures_total = CounterVec::new(
            Opts::new("node_dashboard_rpc_failures_total", "Failed RPC calls"),
            &["method"],
        )?;

        let cache_hits_total = Counter::with_opts(Opts::new(
            "node_dashboard_cache_hits_total",
            "Calls answered from the cache store",
        ))?;

        let cache_misses_total = Counter::with_opts(Opts::new(
            "node_dashboard_cache_misses_total",
            "Calls that required a node round trip",
        ))?;

        let rpc_duration = Histogram::with_opts(
            HistogramOpts::new(
                "node_dashboard_rpc_duration_seconds",
                "Node RPC latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(rpc_calls_total.clone()))?;
        registry.register(Box::new(rpc_failures_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(rpc_duration.clone()))?;

        Ok(Self {
            rpc_calls_total,
            rpc_failures_total,
            cache_hits_total,
            cache_misses_total,
            rpc_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
