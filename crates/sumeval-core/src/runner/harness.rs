//! Evaluation harness
//!
//! Runs a unit of work over every example of a dataset, scores the outputs
//! and hands one record per example to a trace sink. Per-example failures
//! are captured in the records; the run always reaches the end of the
//! dataset unless it is cancelled or the caller asked for fail-fast.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, anyhow};
use chrono::Utc;
use futures::StreamExt;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{EvalConfig, UnitOfWork};
use crate::dataset::{Dataset, DatasetClient, DatasetSource, Example};
use crate::error::{EvalError, EvalResult};
use crate::metrics::{EvaluationRecord, RecordError, RunCollector, RunResult, Score};
use crate::scoring::Scorer;
use crate::trace::RecordSink;

/// Callback for progress updates during evaluation
pub type ProgressCallback = Box<dyn Fn(EvalProgress) + Send + Sync>;

/// Progress update during evaluation
#[derive(Debug, Clone)]
pub struct EvalProgress {
    /// Index of the example being dispatched (0-based)
    pub current: usize,
    /// Total number of examples
    pub total: usize,
    /// Example identifier
    pub identifier: String,
}

/// Harness running evaluation datasets
pub struct EvalHarness {
    config: EvalConfig,
    cancel: CancellationToken,
    progress_callback: Option<ProgressCallback>,
}

impl EvalHarness {
    /// Create a new harness
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            progress_callback: None,
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the current run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Load the dataset from `source`, then run it
    ///
    /// A dataset that cannot be loaded fails with [`EvalError::DatasetLoad`]
    /// before any example is processed.
    pub async fn run_source(
        &self,
        source: &DatasetSource,
        client: Option<&dyn DatasetClient>,
        work: &dyn UnitOfWork,
        scorer: Option<&dyn Scorer>,
        sink: Option<&dyn RecordSink>,
    ) -> EvalResult<RunResult> {
        let dataset = source.load(client).await?;
        tracing::info!(
            source = %source.describe(),
            examples = dataset.len(),
            "Dataset loaded"
        );
        self.run(dataset, work, scorer, sink).await
    }

    /// Run every example of `dataset`
    ///
    /// Records come back in dataset order whatever the concurrency. Only a
    /// fail-fast configuration turns an example failure into an error.
    pub async fn run(
        &self,
        dataset: Dataset,
        work: &dyn UnitOfWork,
        scorer: Option<&dyn Scorer>,
        sink: Option<&dyn RecordSink>,
    ) -> EvalResult<RunResult> {
        let total = dataset.len();
        let concurrency = self.config.concurrency.max(1);
        let mut collector = RunCollector::new(&dataset.name);

        tracing::info!(
            dataset = %dataset.name,
            examples = total,
            concurrency,
            scorer = scorer.map(|s| s.name()),
            "Starting evaluation run"
        );

        let deadline = self
            .config
            .deadline()
            .map(|limit| tokio::time::Instant::now() + limit);
        let deadline_reached = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        let mut deadline_reached = std::pin::pin!(deadline_reached);

        let records = futures::stream::iter(dataset.examples.into_iter().enumerate())
            .map(|(index, example)| {
                self.emit_progress(EvalProgress {
                    current: index,
                    total,
                    identifier: example.identifier.clone(),
                });
                self.process_example(example, work, scorer)
            })
            .buffered(concurrency);
        let mut records = std::pin::pin!(records);

        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!(processed = collector.records().len(), "Evaluation run cancelled");
                    cancelled = true;
                    break;
                }
                _ = &mut deadline_reached => {
                    tracing::warn!(processed = collector.records().len(), "Evaluation deadline reached");
                    cancelled = true;
                    break;
                }
                next = records.next() => {
                    let Some(record) = next else { break };

                    self.forward(sink, &record, &mut collector).await;

                    if !record.succeeded() && !self.config.continue_on_failure {
                        let message = record.error_message().unwrap_or_default().to_string();
                        let identifier = record.identifier.clone();
                        collector.push(record);
                        self.flush_sink(sink, &mut collector).await;
                        return Err(EvalError::example(identifier, message));
                    }
                    collector.push(record);
                }
            }
        }

        self.flush_sink(sink, &mut collector).await;
        let result = collector.finish(cancelled);

        tracing::info!(
            dataset = %result.dataset,
            successes = result.successes,
            failures = result.failures,
            scoring_failures = result.scoring_failures,
            sink_failures = result.sink_failures,
            cancelled = result.cancelled,
            elapsed_secs = result.total_time_secs,
            "Evaluation run finished"
        );

        if self.config.save_results {
            if let Err(e) = self.save_results(&result).await {
                tracing::warn!(error = %format!("{:#}", e), "Failed to save evaluation results");
            }
        }

        Ok(result)
    }

    /// Run the unit of work and the scorer for one example
    async fn process_example(
        &self,
        example: Example,
        work: &dyn UnitOfWork,
        scorer: Option<&dyn Scorer>,
    ) -> EvaluationRecord {
        let span = tracing::info_span!("eval_example", identifier = %example.identifier);
        async move {
            let started = Instant::now();

            let outcome = match self.config.example_timeout() {
                Some(limit) => match timeout(limit, work.run(&example.input)).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("timed out after {}s", limit.as_secs())),
                },
                None => work.run(&example.input).await,
            };

            let (output, score, error) = match outcome {
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "Unit of work failed");
                    (
                        None,
                        None,
                        Some(RecordError::example_processing(format!("{:#}", e))),
                    )
                }
                Ok(output) => match scorer {
                    Some(scorer) => match score_output(scorer, &example, &output) {
                        Ok(value) => (Some(output), Some(Score::Value(value)), None),
                        Err(err) => {
                            tracing::warn!(scorer = scorer.name(), error = %err, "Scoring failed");
                            (Some(output), None, Some(RecordError::scoring(err.to_string())))
                        }
                    },
                    None => (
                        Some(output),
                        self.config.pending_score.then_some(Score::Pending),
                        None,
                    ),
                },
            };

            EvaluationRecord {
                identifier: example.identifier,
                input: example.input,
                expected_output: example.expected_output,
                output,
                score,
                error,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        }
        .instrument(span)
        .await
    }

    /// Hand a record to the sink; failures are logged and counted only
    async fn forward(
        &self,
        sink: Option<&dyn RecordSink>,
        record: &EvaluationRecord,
        collector: &mut RunCollector,
    ) {
        let Some(sink) = sink else { return };
        if let Err(e) = sink.record_example(record).await {
            let err = EvalError::sink(format!("{:#}", e));
            tracing::warn!(identifier = %record.identifier, error = %err, "Trace sink rejected record");
            collector.record_sink_failure();
        }
    }

    async fn flush_sink(&self, sink: Option<&dyn RecordSink>, collector: &mut RunCollector) {
        let Some(sink) = sink else { return };
        if let Err(e) = sink.flush().await {
            let err = EvalError::sink(format!("{:#}", e));
            tracing::warn!(error = %err, "Trace sink flush failed");
            collector.record_sink_failure();
        }
    }

    /// Save a run result as pretty JSON in the output directory
    pub async fn save_results(&self, result: &RunResult) -> anyhow::Result<PathBuf> {
        let output_dir = self
            .config
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        tokio::fs::create_dir_all(&output_dir).await?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let output_path = output_dir.join(format!("eval_results_{}.json", timestamp));

        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&output_path, json)
            .await
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        tracing::info!("Saved evaluation results to {:?}", output_path);
        Ok(output_path)
    }

    fn emit_progress(&self, progress: EvalProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}

/// Score one output; non-finite values count as scorer failures
fn score_output(scorer: &dyn Scorer, example: &Example, output: &str) -> EvalResult<f64> {
    let value = scorer
        .score(&example.input, output, &example.expected_output)
        .map_err(|e| EvalError::scoring(&example.identifier, format!("{:#}", e)))?;
    if !value.is_finite() {
        return Err(EvalError::scoring(
            &example.identifier,
            format!("{} produced a non-finite score ({})", scorer.name(), value),
        ));
    }
    Ok(value)
}
