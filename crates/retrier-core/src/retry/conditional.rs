//! Retry while a test function over (attempt, error) says so.

use super::delay::{self, DelayFn};
use super::policy::{operation_name, Attempt, RetryPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConditionalPolicyConfig, ConfigError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type TestFn<E> = Arc<dyn Fn(u32, &E) -> bool + Send + Sync>;

/// Retries an operation for as long as `test(attempt, &error)` returns true.
///
/// `attempt` is the number of failed invocations so far (1 after the first
/// failure). When the test returns false the last error is returned unchanged.
/// There is no attempt cap of its own: a test that always returns true
/// retries forever, so the caller must make it stop eventually.
pub struct ConditionalRetryPolicy<E> {
    test: TestFn<E>,
    delay: DelayFn,
    clock: Arc<dyn Clock>,
}

impl<E> ConditionalRetryPolicy<E> {
    /// Policy with an immediate retry (zero delay) on the system clock.
    pub fn new<P>(test: P) -> Self
    where
        P: Fn(u32, &E) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
            delay: Arc::new(delay::no_delay()),
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Retry while fewer than `max_attempts` attempts have failed.
    pub fn max_attempts(max_attempts: u32) -> Self {
        Self::new(move |attempt, _: &E| attempt < max_attempts)
    }

    /// Build from the `[conditional]` config section.
    pub fn from_config(cfg: &ConditionalPolicyConfig) -> Result<Self, ConfigError> {
        if cfg.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }
        let delay = cfg.delay.build()?;
        Ok(Self::max_attempts(cfg.max_attempts).with_delay_fn(delay))
    }

    pub fn with_delay<D>(self, delay: D) -> Self
    where
        D: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.with_delay_fn(Arc::new(delay))
    }

    pub fn with_delay_fn(mut self, delay: DelayFn) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<E> Clone for ConditionalRetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            delay: Arc::clone(&self.delay),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E> fmt::Debug for ConditionalRetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalRetryPolicy")
            .field("test", &"<fn>")
            .field("delay", &"<fn>")
            .finish()
    }
}

impl<E: fmt::Display> RetryPolicy<E> for ConditionalRetryPolicy<E> {
    type Error = E;

    fn call<T, F>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let name = operation_name(&operation);
        let mut attempt = 1u32;
        loop {
            let outcome = Attempt::classify(operation(), |e| (self.test)(attempt, e));
            match outcome {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(e) => return Err(e),
                Attempt::Retryable(e) => {
                    let delay = (self.delay)(attempt);
                    tracing::warn!(
                        error = %e,
                        operation = name,
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        "caught error while executing operation, retrying"
                    );
                    self.clock.sleep(delay);
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }
}
