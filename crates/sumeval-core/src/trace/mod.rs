//! Trace sinks receiving one record per processed example
//!
//! Sinks are observability side channels. The harness logs and counts their
//! failures but never lets them change a run's outcome.

mod jsonl;

pub use jsonl::JsonlSink;

use anyhow::Result;
use async_trait::async_trait;

use crate::metrics::EvaluationRecord;

/// Destination for evaluation records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Accept one record
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()>;

    /// Push anything buffered to the backend
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sink emitting one structured log event per record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl RecordSink for TracingSink {
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
        let score = record.score.map(|s| s.to_string());
        match &record.error {
            Some(error) => tracing::warn!(
                identifier = %record.identifier,
                kind = ?error.kind,
                score = ?score,
                error = %error.message,
                "Example recorded with error"
            ),
            None => tracing::info!(
                identifier = %record.identifier,
                output_len = record.output.as_ref().map_or(0, |o| o.len()),
                score = ?score,
                elapsed_ms = record.elapsed_ms,
                "Example recorded"
            ),
        }
        Ok(())
    }
}

/// Sink backed by a closure, for callers that only need an `on_record` hook
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(&EvaluationRecord) -> Result<()> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> RecordSink for CallbackSink<F>
where
    F: Fn(&EvaluationRecord) -> Result<()> + Send + Sync,
{
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
        (self.callback)(record)
    }
}

/// Sink forwarding every record to several sinks
///
/// All sinks are tried; the first failure is reported after the rest ran.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn with_sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add a sink in place
    pub fn push(&mut self, sink: Box<dyn RecordSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl RecordSink for FanoutSink {
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record_example(record).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush().await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct CountingSink {
        seen: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl RecordSink for CountingSink {
        async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
            self.seen.lock().push(record.identifier.clone());
            if self.fail {
                anyhow::bail!("backend unreachable");
            }
            Ok(())
        }
    }

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            identifier: "7".to_string(),
            input: "in".to_string(),
            expected_output: String::new(),
            output: Some("out".to_string()),
            score: None,
            error: None,
            elapsed_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_fanout_reaches_every_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let fanout = FanoutSink::new()
            .with_sink(Box::new(CountingSink {
                seen: seen.clone(),
                fail: true,
            }))
            .with_sink(Box::new(CountingSink {
                seen: seen.clone(),
                fail: false,
            }));

        let result = fanout.record_example(&record()).await;

        assert!(result.is_err());
        assert_eq!(seen.lock().len(), 2);
        assert!(fanout.flush().await.is_ok());
    }

    #[tokio::test]
    async fn test_callback_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let sink = CallbackSink::new(move |record: &EvaluationRecord| {
            captured.lock().push(record.output.clone());
            Ok(())
        });

        sink.record_example(&record()).await.unwrap();
        assert_eq!(*seen.lock(), vec![Some("out".to_string())]);
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_records() {
        assert!(TracingSink.record_example(&record()).await.is_ok());
    }
}
