//! Core record types for evaluation runs
//!
//! Defines the per-example record and the aggregate run result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Score attached to an evaluation record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Numeric score produced by a scorer
    Value(f64),
    /// Placeholder for an evaluation that happens later, outside the run
    Pending,
}

impl Score {
    /// Numeric value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(*v),
            Score::Pending => None,
        }
    }

    /// Check if the score is still pending
    pub fn is_pending(&self) -> bool {
        matches!(self, Score::Pending)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Value(v) => write!(f, "{:.3}", v),
            Score::Pending => write!(f, "pending"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_f64(*v),
            Score::Pending => serializer.serialize_str("pending"),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Score::Value(v)),
            Repr::Label(s) if s == "pending" => Ok(Score::Pending),
            Repr::Label(s) => Err(serde::de::Error::custom(format!(
                "invalid score label '{}'",
                s
            ))),
        }
    }
}

/// Which stage of example processing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorKind {
    /// The unit of work failed; no output was produced
    ExampleProcessing,
    /// The scorer failed; the output is kept
    Scoring,
}

/// Failure captured inside a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordError {
    pub kind: RecordErrorKind,
    pub message: String,
}

impl RecordError {
    pub fn example_processing(message: impl Into<String>) -> Self {
        Self {
            kind: RecordErrorKind::ExampleProcessing,
            message: message.into(),
        }
    }

    pub fn scoring(message: impl Into<String>) -> Self {
        Self {
            kind: RecordErrorKind::Scoring,
            message: message.into(),
        }
    }
}

/// Outcome of processing one example
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Example identifier
    pub identifier: String,

    /// Input handed to the unit of work
    pub input: String,

    /// Reference output (empty when the example has none)
    #[serde(default)]
    pub expected_output: String,

    /// Output of the unit of work, absent on failure
    pub output: Option<String>,

    /// Score, absent when not scored or scoring failed
    pub score: Option<Score>,

    /// Captured failure, if any
    pub error: Option<RecordError>,

    /// Time spent on this example in milliseconds
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl EvaluationRecord {
    /// Whether the unit of work succeeded for this example
    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }

    /// Error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

/// Aggregate result of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Dataset name
    pub dataset: String,

    /// Records in dataset order
    pub records: Vec<EvaluationRecord>,

    /// Examples whose unit of work succeeded
    pub successes: usize,

    /// Examples whose unit of work failed
    pub failures: usize,

    /// Successful examples whose scorer failed
    #[serde(default)]
    pub scoring_failures: usize,

    /// Records (or flushes) the trace sink did not accept
    #[serde(default)]
    pub sink_failures: usize,

    /// Whether the run stopped early on cancellation or deadline
    #[serde(default)]
    pub cancelled: bool,

    /// Run start time
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration in seconds
    pub total_time_secs: f64,
}

impl RunResult {
    /// Number of processed examples
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Fraction of processed examples whose unit of work succeeded
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.successes as f64 / self.records.len() as f64
        }
    }

    /// Mean of all numeric scores, if any were produced
    pub fn mean_score(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .records
            .iter()
            .filter_map(|r| r.score.and_then(|s| s.value()))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Number of records still awaiting a score
    pub fn pending_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.score.is_some_and(|s| s.is_pending()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, output: Option<&str>, score: Option<Score>) -> EvaluationRecord {
        EvaluationRecord {
            identifier: id.to_string(),
            input: "in".to_string(),
            expected_output: String::new(),
            output: output.map(String::from),
            score,
            error: None,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_score_serialization() {
        assert_eq!(serde_json::to_string(&Score::Value(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Score::Pending).unwrap(), "\"pending\"");

        let parsed: Score = serde_json::from_str("\"pending\"").unwrap();
        assert!(parsed.is_pending());
        let parsed: Score = serde_json::from_str("1.0").unwrap();
        assert_eq!(parsed.value(), Some(1.0));
        assert!(serde_json::from_str::<Score>("\"later\"").is_err());
    }

    #[test]
    fn test_run_result_summary() {
        let result = RunResult {
            dataset: "demo".to_string(),
            records: vec![
                record("0", Some("a"), Some(Score::Value(1.0))),
                record("1", Some("b"), Some(Score::Value(0.0))),
                record("2", Some("c"), Some(Score::Pending)),
                record("3", None, None),
            ],
            successes: 3,
            failures: 1,
            scoring_failures: 0,
            sink_failures: 0,
            cancelled: false,
            started_at: Utc::now(),
            total_time_secs: 1.0,
        };

        assert_eq!(result.total(), 4);
        assert_eq!(result.success_rate(), 0.75);
        assert_eq!(result.mean_score(), Some(0.5));
        assert_eq!(result.pending_count(), 1);
    }
}
