//! The common contract of every retry policy.

/// Outcome of a single attempt, as classified by a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// The operation returned a value; stop and return it.
    Success(T),
    /// The operation failed and the policy may try again.
    Retryable(E),
    /// The operation failed and the error goes back to the caller unchanged.
    Terminal(E),
}

impl<T, E> Attempt<T, E> {
    /// Classify an operation result with a retry predicate.
    pub fn classify(result: Result<T, E>, retryable: impl FnOnce(&E) -> bool) -> Self {
        match result {
            Ok(value) => Attempt::Success(value),
            Err(e) if retryable(&e) => Attempt::Retryable(e),
            Err(e) => Attempt::Terminal(e),
        }
    }
}

/// Execute an operation, retrying as the policy directs.
///
/// Policies hold configuration only. Each `call` starts its own attempt
/// counter at 1 and its own clock reading, so one policy can be shared by
/// many callers and threads.
pub trait RetryPolicy<E> {
    /// What the caller gets back when the policy gives up.
    type Error;

    fn call<T, F>(&self, operation: F) -> Result<T, Self::Error>
    where
        F: FnMut() -> Result<T, E>;
}

/// Bind a policy to a target function.
///
/// The returned closure runs `target(args)` under `policy`; `args` is cloned
/// for every attempt. Pass a tuple for several arguments.
pub fn wrap<P, E, A, T, F>(policy: P, target: F) -> impl Fn(A) -> Result<T, P::Error>
where
    P: RetryPolicy<E>,
    A: Clone,
    F: Fn(A) -> Result<T, E>,
{
    move |args: A| policy.call(|| target(args.clone()))
}

/// Human-readable name of an operation for log lines and error messages.
pub(crate) fn operation_name<F>(_operation: &F) -> &'static str {
    std::any::type_name::<F>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_splits_by_predicate() {
        let ok: Attempt<u8, &str> = Attempt::classify(Ok(1), |_| true);
        assert_eq!(ok, Attempt::Success(1));

        let retry: Attempt<u8, &str> = Attempt::classify(Err("timeout"), |e| *e == "timeout");
        assert_eq!(retry, Attempt::Retryable("timeout"));

        let stop: Attempt<u8, &str> = Attempt::classify(Err("forbidden"), |e| *e == "timeout");
        assert_eq!(stop, Attempt::Terminal("forbidden"));
    }

    #[test]
    fn operation_name_uses_type_name() {
        fn fetch() -> Result<(), ()> {
            Ok(())
        }
        assert!(operation_name(&fetch).ends_with("fetch"));
    }
}
