#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use hintstep_lib::{HintError, HintLevel, HintProvider, ProblemContext};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const CAR_PROBLEM: &str = "A car travels 120 km in 2 hours. What is its average speed?";

/// Fake provider: replays queued outcomes, then falls back to
/// `"hint <level>"`. Records every level it was asked for.
#[derive(Default)]
pub struct FakeProvider {
    queued: Mutex<VecDeque<Result<String, HintError>>>,
    requested: Mutex<Vec<HintLevel>>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, hint: &str) {
        self.queued.lock().push_back(Ok(hint.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.queued
            .lock()
            .push_back(Err(HintError::provider_unavailable(message, "fake")));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<HintLevel> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl HintProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate_hint(&self, _context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(level);
        match self.queued.lock().pop_front() {
            Some(outcome) => outcome,
            None => Ok(format!("hint {}", level)),
        }
    }
}

/// Provider that parks inside `generate_hint` until released, so tests can
/// observe the engine while a request is outstanding.
#[derive(Default)]
pub struct GatedProvider {
    /// Notified each time a call enters the provider
    pub entered: Notify,
    /// Notify once per call to let it finish
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HintProvider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate_hint(&self, _context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(format!("gated hint {}", level))
    }
}
