//! Retry and backoff policies.
//!
//! Wraps unreliable operations (outbound HTTP calls, webhook deliveries, token
//! exchanges, lock acquisition) in a retry loop. A policy is built once from
//! its configuration and then called many times; each call is an independent
//! loop on the caller's thread whose only suspension point is the sleep
//! between attempts.
//!
//! - [`ConditionalRetryPolicy`] retries while a test over (attempt, error) holds.
//! - [`TimedRetryPolicy`] retries until a time budget would be exceeded.

mod conditional;
mod delay;
mod error;
mod policy;
mod timed;

pub use conditional::ConditionalRetryPolicy;
pub use delay::{
    constant_delay, exponential_delay, jittered_delay, no_delay, sigmoid_delay, DelayFn,
    SigmoidParams,
};
pub use error::{RetryExhausted, TimedRetryError};
pub use policy::{wrap, Attempt, RetryPolicy};
pub use timed::{TimedRetryPolicy, DURATION_METRIC};
