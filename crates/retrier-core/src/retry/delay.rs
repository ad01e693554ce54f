//! Delay curves: attempt number (1-based) to wait duration.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Shared, reusable delay function.
pub type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// No wait between attempts. Default for the conditional policy.
pub fn no_delay() -> impl Fn(u32) -> Duration + Clone + Send + Sync {
    |_| Duration::ZERO
}

/// The same wait after every failure.
pub fn constant_delay(delay: Duration) -> impl Fn(u32) -> Duration + Clone + Send + Sync {
    move |_| delay
}

/// `base * 2^(attempt-1)`: attempt 1 waits `base`, then doubles.
///
/// There is no cap; pair it with a time budget or a test function that
/// eventually stops. Saturates at `Duration::MAX` instead of overflowing.
pub fn exponential_delay(base: Duration) -> impl Fn(u32) -> Duration + Clone + Send + Sync {
    move |attempt| {
        let exp = attempt.saturating_sub(1);
        if exp >= u32::BITS {
            return if base.is_zero() { base } else { Duration::MAX };
        }
        base.checked_mul(1u32 << exp).unwrap_or(Duration::MAX)
    }
}

/// Parameters of the S-curve delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidParams {
    /// Slides the window along the attempt axis. Smaller means faster retries.
    pub offset: f64,
    pub midpoint: f64,
    /// Curve sharpness. 0 is flat at 0.5s; large values approach a step.
    pub step: f64,
}

impl Default for SigmoidParams {
    fn default() -> Self {
        Self {
            offset: -5.0,
            midpoint: 0.0,
            step: 1.0,
        }
    }
}

/// Logistic curve `1 / (1 + e^(-step * ((attempt + offset) - midpoint)))` seconds.
///
/// Ramps from near-immediate retries towards one retry per second and never
/// exceeds one second. Scale the result for longer waits.
///
/// `Duration` has nanosecond resolution: points of the curve below 1ns (e.g.
/// early attempts with a steep `step`) come out as `Duration::ZERO`.
pub fn sigmoid_delay(params: SigmoidParams) -> impl Fn(u32) -> Duration + Clone + Send + Sync {
    move |attempt| {
        let x = (f64::from(attempt) + params.offset) - params.midpoint;
        let secs = 1.0 / (1.0 + (-params.step * x).exp());
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// 100ms ± 50ms of uniform jitter. Default for the timed policy.
pub fn jittered_delay() -> impl Fn(u32) -> Duration + Clone + Send + Sync {
    |_| {
        let r: f64 = rand::thread_rng().gen();
        Duration::from_secs_f64(0.1 + (r - 0.5) / 10.0)
    }
}
