use async_trait::async_trait;
use crate::circuit_breaker::{CircuitBreaker, ExponentialBackoff};
use crate::config::HintConfig;
use crate::error::HintError;
use crate::hints::context::ProblemContext;
use crate::hints::level::HintLevel;
use crate::hints::provider::HintProvider;

/// Wraps a provider with bounded retry and a circuit breaker.
///
/// This sits on the provider side of the boundary: the engine still sees
/// one call and one outcome per level, and still never retries on its own.
pub struct ResilientProvider<P: HintProvider> {
    inner: P,
    breaker: CircuitBreaker,
    backoff: ExponentialBackoff,
    max_retries: u32,
}

impl<P: HintProvider> ResilientProvider<P> {
    pub fn new(inner: P, config: &HintConfig) -> Self {
        ResilientProvider {
            inner,
            breaker: CircuitBreaker::new(config.breaker_cooldown(), config.breaker_threshold),
            backoff: ExponentialBackoff::default(),
            max_retries: config.max_retries,
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: HintProvider> HintProvider for ResilientProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        let mut attempt = 0;
        loop {
            if !self.breaker.allows_call() {
                tracing::warn!(
                    provider = self.inner.name(),
                    failures = self.breaker.failure_count(),
                    "Circuit open, refusing hint call"
                );
                return Err(HintError::provider_unavailable("Hint provider circuit is open", "circuit_breaker")
                    .with_level(level)
                    .with_provider(self.inner.name()));
            }

            match self.inner.generate_hint(context, level).await {
                Ok(hint) => {
                    if attempt > 0 {
                        tracing::info!(
                            provider = self.inner.name(),
                            level = level.as_u8(),
                            attempt = attempt,
                            "Hint call succeeded after retry"
                        );
                    }
                    self.breaker.record_success();
                    return Ok(hint);
                }
                Err(mut e) => {
                    if !e.is_retryable() || attempt >= self.max_retries {
                        // One breaker failure per exhausted call, not per attempt
                        if e.is_retryable() {
                            self.breaker.record_failure();
                        }
                        tracing::error!(
                            provider = self.inner.name(),
                            level = level.as_u8(),
                            attempts = attempt + 1,
                            error = %e,
                            "Hint call failed"
                        );
                        let attempts = format!("after {} attempt(s)", attempt + 1);
                        let context = match e.context.take() {
                            Some(existing) => format!("{}; {}", existing, attempts),
                            None => attempts,
                        };
                        return Err(e.with_context(context));
                    }

                    let delay = self.backoff.jittered_delay(attempt);
                    tracing::warn!(
                        provider = self.inner.name(),
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Hint call failed, retrying with backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
