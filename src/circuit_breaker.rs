use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use parking_lot::Mutex;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls flow normally
    Closed,
    /// Calls are refused until the cooldown passes
    Open,
    /// Cooldown passed; the next call decides whether to close or reopen
    HalfOpen,
}

/// Circuit breaker guarding one provider.
///
/// Opens after `failure_threshold` consecutive failures and refuses calls
/// for `cooldown`. After that a single trial call is allowed through.
#[derive(Debug)]
pub struct CircuitBreaker {
    failures: AtomicU64,
    opened_at: Mutex<Option<Instant>>,
    cooldown: Duration,
    failure_threshold: u64,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u64) -> Self {
        CircuitBreaker {
            failures: AtomicU64::new(0),
            opened_at: Mutex::new(None),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn state(&self) -> BreakerState {
        match *self.opened_at.lock() {
            None => BreakerState::Closed,
            Some(at) if at.elapsed() >= self.cooldown => BreakerState::HalfOpen,
            Some(_) => BreakerState::Open,
        }
    }

    /// Whether a call may go out right now
    pub fn allows_call(&self) -> bool {
        self.state() != BreakerState::Open
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        *self.opened_at.lock() = None;
    }

    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        let mut opened_at = self.opened_at.lock();
        // A failed half-open trial restarts the cooldown.
        if failures >= self.failure_threshold || opened_at.is_some() {
            *opened_at = Some(Instant::now());
        }
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Exponential backoff calculator
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay_ms: u64,
    max_delay_ms: u64,
    multiplier: f64,
    jitter_ms: u64,
}

impl ExponentialBackoff {
    pub fn new(initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        ExponentialBackoff {
            initial_delay_ms,
            max_delay_ms,
            multiplier: 2.0,
            jitter_ms: 0,
        }
    }

    /// Add up to `jitter_ms` of random delay on top of each step
    pub fn with_jitter(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Calculate delay for attempt number (0-indexed), without jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let delay = (self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32)) as u64;
        delay.min(self.max_delay_ms)
    }

    /// Delay for `attempt` including jitter, still capped at the max
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let base = self.delay_for_attempt(attempt);
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis((base + jitter).min(self.max_delay_ms))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(100, 5000).with_jitter(50) // 100ms initial, 5s max
    }
}
