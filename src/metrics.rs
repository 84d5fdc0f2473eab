use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Counters for hint traffic.
/// All fields are atomics so one instance can be shared across engines.
#[derive(Debug, Default)]
pub struct HintMetrics {
    /// Provider invocations (cache misses at levels 1-3)
    provider_calls: AtomicU64,
    /// Provider invocations that failed or came back empty
    provider_failures: AtomicU64,
    /// Sum of provider latency in milliseconds
    provider_latency_ms: AtomicU64,
    /// Levels served from the engine cache
    cache_hits: AtomicU64,
    /// Requests made after every level was delivered
    exhausted_requests: AtomicU64,
    /// Requests rejected because another was in flight
    busy_rejections: AtomicU64,
}

/// Point-in-time copy of [`HintMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub provider_calls: u64,
    pub provider_failures: u64,
    pub provider_latency_ms: u64,
    pub cache_hits: u64,
    pub exhausted_requests: u64,
    pub busy_rejections: u64,
}

impl HintMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_latency(&self, ms: u64) {
        self.provider_latency_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exhausted(&self) {
        self.exhausted_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_busy(&self) {
        self.busy_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            provider_latency_ms: self.provider_latency_ms.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            exhausted_requests: self.exhausted_requests.load(Ordering::Relaxed),
            busy_rejections: self.busy_rejections.load(Ordering::Relaxed),
        }
    }
}
