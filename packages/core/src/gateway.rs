//! Cached, failure-tolerant access to the node.
//!
//! The [`Gateway`] composes the transport and the cache store. A batch of
//! calls runs concurrently; each call succeeds or fails on its own, and
//! the failures come back alongside the outcomes instead of aborting the
//! batch.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{cache_key, CacheStatus, CacheStore, TtlPolicy};
use crate::error::RpcError;
use crate::metrics::AppMetrics;
use crate::services::RpcTransport;

/// A logical request: method plus ordered params.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self::with_params(method, Vec::new())
    }

    pub fn with_params(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Identity of the call in the cache store.
    pub fn key(&self) -> String {
        cache_key(&self.method, &self.params)
    }
}

impl fmt::Display for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.method, Value::Array(self.params.clone()))
    }
}

/// A failed call and a human-readable cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub call: RpcCall,
    pub cause: String,
}

impl FailureRecord {
    pub fn from_error(call: &RpcCall, err: &RpcError) -> Self {
        Self {
            call: call.clone(),
            cause: err.to_string(),
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cause)
    }
}

/// Result of one call: a payload or a failure, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Success(Value),
    Failure(FailureRecord),
}

impl RpcOutcome {
    pub fn payload(&self) -> Option<&Value> {
        match self {
            RpcOutcome::Success(value) => Some(value),
            RpcOutcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RpcOutcome::Success(_))
    }
}

/// Outcomes of one batch, in first-seen call order, plus its failure log.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    outcomes: Vec<(RpcCall, RpcOutcome)>,
    errors: Vec<FailureRecord>,
}

impl BatchResult {
    pub fn get(&self, call: &RpcCall) -> Option<&RpcOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == call)
            .map(|(_, outcome)| outcome)
    }

    /// Payload of `call`, if it was requested and succeeded.
    pub fn payload(&self, call: &RpcCall) -> Option<&Value> {
        self.get(call).and_then(RpcOutcome::payload)
    }

    pub fn outcomes(&self) -> &[(RpcCall, RpcOutcome)] {
        &self.outcomes
    }

    pub fn errors(&self) -> &[FailureRecord] {
        &self.errors
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }
}

pub struct Gateway {
    transport: Arc<dyn RpcTransport + Send + Sync>,
    store: CacheStore,
    ttl_policy: TtlPolicy,
    metrics: Option<Arc<AppMetrics>>,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn RpcTransport + Send + Sync>,
        store: CacheStore,
        ttl_policy: TtlPolicy,
    ) -> Self {
        Self {
            transport,
            store,
            ttl_policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Resolve a single call through the cache.
    pub async fn fetch(&self, call: &RpcCall) -> RpcOutcome {
        let result = self
            .store
            .get(&call.method, &call.params, &self.ttl_policy, || {
                self.fetch_from_node(call)
            })
            .await;

        match result {
            Ok(cached) => {
                if cached.status == CacheStatus::Hit {
                    if let Some(metrics) = &self.metrics {
                        metrics.cache_hits_total.inc();
                    }
                }
                RpcOutcome::Success(cached.payload)
            }
            Err(err) => {
                tracing::warn!(
                    method = %call.method,
                    node = %self.transport.transport_name(),
                    "{}",
                    err
                );
                RpcOutcome::Failure(FailureRecord::from_error(call, &err))
            }
        }
    }

    /// Resolve every call; identical calls are fetched once.
    pub async fn fetch_many(&self, calls: &[RpcCall]) -> BatchResult {
        let mut unique: Vec<&RpcCall> = Vec::with_capacity(calls.len());
        for call in calls {
            if !unique.iter().any(|seen| *seen == call) {
                unique.push(call);
            }
        }

        let fetched = join_all(unique.iter().map(|call| self.fetch(call))).await;

        let outcomes: Vec<(RpcCall, RpcOutcome)> =
            unique.into_iter().cloned().zip(fetched).collect();
        let errors = outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                RpcOutcome::Failure(record) => Some(record.clone()),
                RpcOutcome::Success(_) => None,
            })
            .collect();

        BatchResult { outcomes, errors }
    }

    async fn fetch_from_node(&self, call: &RpcCall) -> Result<Value, RpcError> {
        let started = Instant::now();
        let result = self.transport.call(&call.method, &call.params).await;

        if let Some(metrics) = &self.metrics {
            metrics.cache_misses_total.inc();
            metrics
                .rpc_calls_total
                .with_label_values(&[call.method.as_str()])
                .inc();
            metrics.rpc_duration.observe(started.elapsed().as_secs_f64());
            if result.is_err() {
                metrics
                    .rpc_failures_total
                    .with_label_values(&[call.method.as_str()])
                    .inc();
            }
        }

        result
    }
}
