//! Terminal errors returned by the retry policies.

use std::fmt;
use std::time::Duration;

/// The time budget ran out before the operation succeeded.
///
/// Always carries the last error the operation returned; it is exposed as the
/// `source()` of this error and through `last_error`.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    message: String,
    elapsed: Duration,
    attempts: u32,
    last_error: E,
}

impl<E> RetryExhausted<E> {
    pub(crate) fn new(operation: &str, elapsed: Duration, attempts: u32, last_error: E) -> Self {
        let message = format!(
            "could not successfully execute {} within {:.3} seconds ({} attempts)",
            operation,
            elapsed.as_secs_f64(),
            attempts
        );
        Self {
            message,
            elapsed,
            attempts,
            last_error,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Time between the first attempt and the decision to stop.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of attempts made, including the last failed one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> &E {
        &self.last_error
    }

    pub fn into_last_error(self) -> E {
        self.last_error
    }
}

impl<E> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E> std::error::Error for RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Error returned by `TimedRetryPolicy`.
#[derive(Debug)]
pub enum TimedRetryError<E> {
    /// Budget exhausted while the operation kept failing with retryable errors.
    Exhausted(RetryExhausted<E>),
    /// The operation failed with an error the policy does not retry. Returned unchanged.
    NotRetryable(E),
}

impl<E> TimedRetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TimedRetryError::Exhausted(_))
    }

    pub fn last_error(&self) -> &E {
        match self {
            TimedRetryError::Exhausted(e) => e.last_error(),
            TimedRetryError::NotRetryable(e) => e,
        }
    }

    /// The operation's own error, whichever way the policy stopped.
    pub fn into_last_error(self) -> E {
        match self {
            TimedRetryError::Exhausted(e) => e.into_last_error(),
            TimedRetryError::NotRetryable(e) => e,
        }
    }
}

impl<E: fmt::Display> fmt::Display for TimedRetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimedRetryError::Exhausted(e) => write!(f, "{}", e),
            TimedRetryError::NotRetryable(e) => write!(f, "{}", e),
        }
    }
}

impl<E> std::error::Error for TimedRetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimedRetryError::Exhausted(e) => Some(e),
            TimedRetryError::NotRetryable(e) => e.source(),
        }
    }
}

impl<E> From<RetryExhausted<E>> for TimedRetryError<E> {
    fn from(e: RetryExhausted<E>) -> Self {
        TimedRetryError::Exhausted(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug, PartialEq)]
    struct Boom(u32);

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom #{}", self.0)
        }
    }

    impl Error for Boom {}

    #[test]
    fn message_reports_elapsed_and_attempts() {
        let e = RetryExhausted::new("fetch_token", Duration::from_millis(1250), 4, Boom(4));
        assert_eq!(
            e.to_string(),
            "could not successfully execute fetch_token within 1.250 seconds (4 attempts)"
        );
        assert_eq!(e.attempts(), 4);
        assert_eq!(e.elapsed(), Duration::from_millis(1250));
    }

    #[test]
    fn cause_chain_keeps_last_error() {
        let e = RetryExhausted::new("op", Duration::ZERO, 1, Boom(7));
        let source = e.source().expect("source");
        assert_eq!(source.to_string(), "boom #7");
        assert_eq!(source.downcast_ref::<Boom>(), Some(&Boom(7)));
        assert_eq!(e.into_last_error(), Boom(7));
    }

    #[test]
    fn timed_error_unwraps_either_variant() {
        let exhausted: TimedRetryError<Boom> =
            RetryExhausted::new("op", Duration::ZERO, 2, Boom(2)).into();
        assert!(exhausted.is_exhausted());
        assert_eq!(exhausted.last_error(), &Boom(2));
        assert!(exhausted.source().is_some());

        let passthrough = TimedRetryError::NotRetryable(Boom(1));
        assert!(!passthrough.is_exhausted());
        assert_eq!(passthrough.to_string(), "boom #1");
        assert_eq!(passthrough.into_last_error(), Boom(1));
    }
}
