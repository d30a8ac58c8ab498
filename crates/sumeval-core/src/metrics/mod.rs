//! Evaluation records and run aggregation
//!
//! Types produced by the harness for each example and for the run as a whole.

mod collector;
mod types;

pub use collector::RunCollector;
pub use types::{EvaluationRecord, RecordError, RecordErrorKind, RunResult, Score};
