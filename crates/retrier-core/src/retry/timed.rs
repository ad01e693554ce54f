//! Retry until a wall-clock budget runs out.

use super::delay::{self, DelayFn};
use super::error::{RetryExhausted, TimedRetryError};
use super::policy::{operation_name, Attempt, RetryPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, TimedPolicyConfig};
use crate::timing::{MetricsFacade, MetricsSink};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Name of the timing sample emitted once per call when a metric instance is set.
pub const DURATION_METRIC: &str = "timedretrypolicy.duration";

type RetryableFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Retries an operation as many times as fit in `timeout`.
///
/// Before each retry the policy checks that `now + delay` does not pass
/// `start + timeout`; landing exactly on the deadline is still allowed. When
/// it would pass, the call fails with `TimedRetryError::Exhausted` carrying
/// the last error. Errors rejected by `retry_if` are returned immediately as
/// `TimedRetryError::NotRetryable`.
pub struct TimedRetryPolicy<E> {
    timeout: Duration,
    delay: DelayFn,
    retryable: RetryableFn<E>,
    clock: Arc<dyn Clock>,
    metric_instance: Option<String>,
    metric_tags: BTreeMap<String, String>,
    metrics: Arc<dyn MetricsSink>,
    log_original_error: bool,
}

impl<E> TimedRetryPolicy<E> {
    /// Policy retrying every error with 100ms ± 50ms jitter on the system clock.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            delay: Arc::new(delay::jittered_delay()),
            retryable: Arc::new(|_| true),
            clock: Arc::new(SystemClock::new()),
            metric_instance: None,
            metric_tags: BTreeMap::new(),
            metrics: Arc::new(MetricsFacade),
            log_original_error: false,
        }
    }

    /// Build from the `[timed]` config section.
    pub fn from_config(cfg: &TimedPolicyConfig) -> Result<Self, ConfigError> {
        let timeout = cfg.timeout()?;
        let delay = cfg.delay.build()?;
        let mut policy = Self::new(timeout)
            .with_delay_fn(delay)
            .log_original_error(cfg.log_original_error);
        if let Some(instance) = &cfg.metric_instance {
            policy = policy.with_metric(instance.clone(), cfg.metric_tags.clone());
        }
        Ok(policy)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Instance label of the duration sample, if one is emitted.
    pub fn metric_instance(&self) -> Option<&str> {
        self.metric_instance.as_deref()
    }

    pub fn logs_original_error(&self) -> bool {
        self.log_original_error
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

    /// Only retry errors matching `pred`; everything else is returned at once.
    pub fn retry_if<P>(mut self, pred: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(pred);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Emit a duration sample per call, labelled with `instance` and `tags`.
    pub fn with_metric(mut self, instance: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        self.metric_instance = Some(instance.into());
        self.metric_tags = tags;
        self
    }

    /// Replace the default `metrics` facade sink.
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    /// Log each retryable error at info level before deciding what to do.
    pub fn log_original_error(mut self, enabled: bool) -> Self {
        self.log_original_error = enabled;
        self
    }
}

impl<E> Clone for TimedRetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            timeout: self.timeout,
            delay: Arc::clone(&self.delay),
            retryable: Arc::clone(&self.retryable),
            clock: Arc::clone(&self.clock),
            metric_instance: self.metric_instance.clone(),
            metric_tags: self.metric_tags.clone(),
            metrics: Arc::clone(&self.metrics),
            log_original_error: self.log_original_error,
        }
    }
}

impl<E> fmt::Debug for TimedRetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedRetryPolicy")
            .field("timeout", &self.timeout)
            .field("metric_instance", &self.metric_instance)
            .field("metric_tags", &self.metric_tags)
            .field("log_original_error", &self.log_original_error)
            .finish_non_exhaustive()
    }
}

/// Emits the duration sample when the call returns, whichever way it exits.
struct TimingGuard<'a> {
    clock: &'a dyn Clock,
    sink: &'a dyn MetricsSink,
    instance: Option<&'a str>,
    tags: &'a BTreeMap<String, String>,
    start: Duration,
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        if let Some(instance) = self.instance {
            let elapsed = self.clock.now().saturating_sub(self.start);
            self.sink
                .record_timing(DURATION_METRIC, elapsed, instance, self.tags);
        }
    }
}

impl<E: fmt::Display> RetryPolicy<E> for TimedRetryPolicy<E> {
    type Error = TimedRetryError<E>;

    fn call<T, F>(&self, mut operation: F) -> Result<T, TimedRetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        let name = operation_name(&operation);
        let start = self.clock.now();
        let deadline = start.saturating_add(self.timeout);
        let _timing = TimingGuard {
            clock: self.clock.as_ref(),
            sink: self.metrics.as_ref(),
            instance: self.metric_instance.as_deref(),
            tags: &self.metric_tags,
            start,
        };

        let mut attempt = 1u32;
        loop {
            let outcome = Attempt::classify(operation(), |e| (self.retryable)(e));
            let error = match outcome {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(e) => return Err(TimedRetryError::NotRetryable(e)),
                Attempt::Retryable(e) => e,
            };

            if self.log_original_error {
                tracing::info!(error = %error, operation = name, attempt, "operation failed");
            }
            let delay = (self.delay)(attempt);
            let now = self.clock.now();
            if now.saturating_add(delay) > deadline {
                let elapsed = now.saturating_sub(start);
                return Err(RetryExhausted::new(name, elapsed, attempt, error).into());
            }

            tracing::debug!(
                error = %error,
                operation = name,
                attempt,
                delay_secs = delay.as_secs_f64(),
                "failed to execute operation, retrying"
            );
            self.clock.sleep(delay);
            attempt = attempt.saturating_add(1);
        }
    }
}
