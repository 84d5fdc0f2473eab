use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use crate::error::{ErrorKind, HintError};
use crate::hints::context::{EquationData, ProblemContext};
use crate::hints::level::{HintLevel, EXHAUSTED_LEVEL};
use crate::hints::provider::HintProvider;
use crate::metrics::HintMetrics;
use crate::perf::PerfTimer;

/// A hint handed back to the caller, tagged with the level it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintResponse {
    pub hint: String,
    pub level: HintLevel,
}

/// A resolved level as held in the engine cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintRecord {
    pub level: HintLevel,
    pub text: String,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug)]
struct EngineState {
    /// Next level to hand out; `None` once all three are delivered
    cursor: Option<HintLevel>,
    cache: BTreeMap<HintLevel, HintRecord>,
    /// Bumped by every reset so late provider results can be recognised
    generation: u64,
}

impl EngineState {
    fn fresh(generation: u64) -> Self {
        EngineState {
            cursor: Some(HintLevel::First),
            cache: BTreeMap::new(),
            generation,
        }
    }

    fn advance(&mut self) {
        self.cursor = self.cursor.and_then(HintLevel::next);
    }
}

/// Held for the lifetime of one `next_hint` call, released on drop
/// (including when the call's future is cancelled).
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Hands out hints for one problem, one level at a time.
///
/// Levels escalate 1 → 2 → 3 and each resolved level is cached, so the
/// provider is asked at most once per level between resets. A failed
/// request leaves the engine exactly as it was, which makes retrying the
/// caller's call to make.
///
/// Overlapping `next_hint` calls on one instance are rejected with
/// [`ErrorKind::Busy`]; a `reset` while a request is outstanding causes
/// that request to fail with [`ErrorKind::Superseded`] instead of
/// writing into the fresh state.
pub struct HintEscalationEngine<P: HintProvider> {
    provider: P,
    context: ProblemContext,
    fingerprint: String,
    state: Mutex<EngineState>,
    in_flight: AtomicBool,
    metrics: Arc<HintMetrics>,
}

impl<P: HintProvider> HintEscalationEngine<P> {
    /// Bind an engine to a problem. Blank problem text is rejected.
    pub fn new<S: Into<String>>(
        provider: P,
        problem: S,
        equation: Option<EquationData>,
    ) -> Result<Self, HintError> {
        let context = ProblemContext::new(problem, equation)?;
        Ok(Self::from_context(provider, context))
    }

    pub fn from_context(provider: P, context: ProblemContext) -> Self {
        let fingerprint = context.fingerprint();
        tracing::debug!(
            problem = %fingerprint,
            provider = provider.name(),
            has_equation = context.equation().is_some(),
            "Hint engine created"
        );
        HintEscalationEngine {
            provider,
            context,
            fingerprint,
            state: Mutex::new(EngineState::fresh(0)),
            in_flight: AtomicBool::new(false),
            metrics: Arc::new(HintMetrics::new()),
        }
    }

    /// Share a metrics sink across engines
    pub fn with_metrics(mut self, metrics: Arc<HintMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Resolve the next level.
    ///
    /// `Ok(None)` means every level has been delivered; the provider is not
    /// contacted in that case. On `Err` the level is unchanged.
    pub async fn next_hint(&self) -> Result<Option<HintResponse>, HintError> {
        let _guard = match InFlightGuard::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                self.metrics.record_busy();
                tracing::warn!(problem = %self.fingerprint, "Hint request rejected, another is in flight");
                return Err(HintError::new(
                    ErrorKind::Busy,
                    "A hint request is already in flight for this problem",
                    "engine",
                ));
            }
        };

        let (level, generation) = {
            let mut state = self.state.lock();
            let Some(level) = state.cursor else {
                self.metrics.record_exhausted();
                tracing::debug!(problem = %self.fingerprint, "No more hints");
                return Ok(None);
            };

            // The cursor normally runs ahead of the cache; a cached level is
            // still never sent to the provider twice.
            if let Some(record) = state.cache.get(&level) {
                let hint = record.text.clone();
                state.advance();
                self.metrics.record_cache_hit();
                tracing::debug!(problem = %self.fingerprint, level = level.as_u8(), "Hint cache hit");
                return Ok(Some(HintResponse { hint, level }));
            }

            (level, state.generation)
        };

        self.metrics.record_provider_call();
        let timer = PerfTimer::new("hint_provider_call");
        let result = self.provider.generate_hint(&self.context, level).await;
        let latency_ms = timer.elapsed_ms();
        self.metrics.record_provider_latency(latency_ms);

        let hint = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.metrics.record_provider_failure();
                tracing::warn!(
                    problem = %self.fingerprint,
                    level = level.as_u8(),
                    provider = self.provider.name(),
                    "Provider returned an empty hint"
                );
                return Err(HintError::provider_unavailable("No hint returned from provider", "engine")
                    .with_level(level)
                    .with_provider(self.provider.name()));
            }
            Err(e) => {
                self.metrics.record_provider_failure();
                tracing::warn!(
                    problem = %self.fingerprint,
                    level = level.as_u8(),
                    provider = self.provider.name(),
                    latency_ms = latency_ms,
                    error = %e,
                    "Hint provider failed"
                );
                return Err(self.annotate(e, level));
            }
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::info!(
                problem = %self.fingerprint,
                level = level.as_u8(),
                "Discarding hint resolved across a reset"
            );
            return Err(HintError::new(
                ErrorKind::Superseded,
                "The engine was reset while this hint was being generated",
                "engine",
            )
            .with_level(level));
        }

        state.cache.insert(
            level,
            HintRecord {
                level,
                text: hint.clone(),
                resolved_at: Utc::now(),
            },
        );
        state.advance();
        tracing::info!(
            problem = %self.fingerprint,
            level = level.as_u8(),
            provider = self.provider.name(),
            latency_ms = latency_ms,
            "Hint resolved"
        );

        Ok(Some(HintResponse { hint, level }))
    }

    /// Full restart: forget every cached level and go back to level 1
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let generation = state.generation + 1;
        *state = EngineState::fresh(generation);
        tracing::info!(problem = %self.fingerprint, "Hint engine reset");
    }

    pub fn has_more_hints(&self) -> bool {
        self.state.lock().cursor.is_some()
    }

    /// Level the next call will resolve, or 4 once exhausted
    pub fn current_level(&self) -> u8 {
        self.state
            .lock()
            .cursor
            .map(HintLevel::as_u8)
            .unwrap_or(EXHAUSTED_LEVEL)
    }

    /// Whether a `next_hint` call is currently outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Levels resolved since construction or the last reset, in order
    pub fn delivered_hints(&self) -> Vec<HintRecord> {
        self.state.lock().cache.values().cloned().collect()
    }

    pub fn context(&self) -> &ProblemContext {
        &self.context
    }

    pub fn metrics(&self) -> &Arc<HintMetrics> {
        &self.metrics
    }

    fn annotate(&self, mut error: HintError, level: HintLevel) -> HintError {
        if error.level.is_none() {
            error.level = Some(level);
        }
        if error.provider.is_none() {
            error.provider = Some(self.provider.name().to_string());
        }
        error
    }
}
