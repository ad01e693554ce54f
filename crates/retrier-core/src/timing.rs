//! Timing sink for retry policy durations.

use std::collections::BTreeMap;
use std::time::Duration;

/// Receives one timing sample per timed policy invocation.
pub trait MetricsSink: Send + Sync {
    /// Record `duration` under `name`, labelled with the policy `instance`
    /// and any extra `tags`.
    fn record_timing(
        &self,
        name: &str,
        duration: Duration,
        instance: &str,
        tags: &BTreeMap<String, String>,
    );
}

/// Forwards samples to the `metrics` facade as a histogram in seconds.
/// Without an installed recorder this does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsFacade;

impl MetricsSink for MetricsFacade {
    fn record_timing(
        &self,
        name: &str,
        duration: Duration,
        instance: &str,
        tags: &BTreeMap<String, String>,
    ) {
        let mut labels = Vec::with_capacity(tags.len() + 1);
        labels.push(::metrics::Label::new("instance", instance.to_string()));
        for (key, value) in tags {
            labels.push(::metrics::Label::new(key.clone(), value.clone()));
        }
        ::metrics::histogram!(name.to_string(), labels).record(duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_without_recorder_is_noop() {
        let mut tags = BTreeMap::new();
        tags.insert("integration".to_string(), "github".to_string());
        MetricsFacade.record_timing(
            "timedretrypolicy.duration",
            Duration::from_millis(120),
            "token-exchange",
            &tags,
        );
    }
}
