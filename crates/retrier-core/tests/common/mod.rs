//! Shared fixtures: integration-style errors and a recording metrics sink.

#![allow(dead_code)]

use retrier_core::timing::MetricsSink;
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Errors an integration client might surface. `call` is the 1-based call
/// that produced the error, so tests can tell which failure came back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream timed out (call {call})")]
    Timeout { call: u32 },
    #[error("upstream refused credentials (call {call})")]
    Forbidden { call: u32 },
}

impl UpstreamError {
    pub fn call(&self) -> u32 {
        match self {
            UpstreamError::Timeout { call } | UpstreamError::Forbidden { call } => *call,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub duration: Duration,
    pub instance: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    samples: Mutex<Vec<Sample>>,
}

impl RecordingSink {
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record_timing(
        &self,
        name: &str,
        duration: Duration,
        instance: &str,
        tags: &BTreeMap<String, String>,
    ) {
        self.samples.lock().unwrap().push(Sample {
            name: name.to_string(),
            duration,
            instance: instance.to_string(),
            tags: tags.clone(),
        });
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// In-memory writer for a test-scoped tracing subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with info-level events captured into this buffer.
    pub fn capture_info<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
