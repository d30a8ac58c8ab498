//! Dataset-driven evaluation harness
//!
//! This crate runs a unit of work (typically an LLM summarizer) over a set of
//! labeled examples, scores each output against its reference and sends one
//! trace record per example to an observability backend.
//!
//! # Features
//!
//! - **Datasets**: local JSON/YAML files or named Langfuse datasets
//! - **Failure isolation**: a failing example is recorded and the run goes on
//! - **Ordered concurrency**: optional parallelism with records kept in order
//! - **Cancellation**: token or deadline, returning a partial result
//! - **Trace sinks**: structured logs, JSON Lines files, Langfuse ingestion
//! - **Reports**: JSON, Markdown and terminal tables
//!
//! # Example
//!
//! ```rust,ignore
//! use sumeval_core::{EvalConfig, EvalHarness, FnUnitOfWork, load_dataset_from_json};
//!
//! let dataset = load_dataset_from_json("demo", r#"[{"input": "A", "expectedOutput": "a"}]"#)?;
//! let work = FnUnitOfWork::new(|input: &str| Ok(input.to_lowercase()));
//! let harness = EvalHarness::new(EvalConfig::default());
//! let result = harness.run(dataset, &work, Some(&sumeval_core::ExactMatch), None).await?;
//! ```

pub mod dataset;
pub mod error;
pub mod langfuse;
pub mod llm;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod trace;

// Re-exports for convenience
pub use dataset::{
    Dataset, DatasetClient, DatasetLoader, DatasetOrigin, DatasetSource, Example,
    load_dataset_from_json,
};
pub use error::{EvalError, EvalResult};
pub use metrics::{EvaluationRecord, RecordError, RecordErrorKind, RunResult, Score};
pub use runner::{DatasetMode, EvalConfig, EvalHarness, EvalProgress, FnUnitOfWork, UnitOfWork};
pub use scoring::{ContainsReference, ExactMatch, FnScorer, Scorer, ScorerKind};
pub use trace::{CallbackSink, FanoutSink, JsonlSink, RecordSink, TracingSink};
