//! Run collector for tracking evaluation progress
//!
//! Accumulates records and counters while a run is in progress.

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::types::{EvaluationRecord, RecordErrorKind, RunResult};

/// Collector for gathering records during a run
pub struct RunCollector {
    dataset: String,
    records: Vec<EvaluationRecord>,
    successes: usize,
    failures: usize,
    scoring_failures: usize,
    sink_failures: usize,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl RunCollector {
    /// Create a new collector for the named dataset
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            records: Vec::new(),
            successes: 0,
            failures: 0,
            scoring_failures: 0,
            sink_failures: 0,
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    /// Append a finished record and update the counters
    pub fn push(&mut self, record: EvaluationRecord) {
        if record.succeeded() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        if record
            .error
            .as_ref()
            .is_some_and(|e| e.kind == RecordErrorKind::Scoring)
        {
            self.scoring_failures += 1;
        }
        self.records.push(record);
    }

    /// Count a record or flush the sink did not accept
    pub fn record_sink_failure(&mut self) {
        self.sink_failures += 1;
    }

    /// Records collected so far
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    /// Number of successful examples so far
    pub fn success_count(&self) -> usize {
        self.successes
    }

    /// Number of failed examples so far
    pub fn failure_count(&self) -> usize {
        self.failures
    }

    /// Get total elapsed time
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Close the run
    pub fn finish(self, cancelled: bool) -> RunResult {
        let total_time_secs = self.elapsed_secs();
        RunResult {
            dataset: self.dataset,
            records: self.records,
            successes: self.successes,
            failures: self.failures,
            scoring_failures: self.scoring_failures,
            sink_failures: self.sink_failures,
            cancelled,
            started_at: self.started_at,
            total_time_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{RecordError, Score};

    fn record(id: &str) -> EvaluationRecord {
        EvaluationRecord {
            identifier: id.to_string(),
            input: "text".to_string(),
            expected_output: String::new(),
            output: None,
            score: None,
            error: None,
            elapsed_ms: 3,
        }
    }

    #[test]
    fn test_collector_counts() {
        let mut collector = RunCollector::new("demo");

        let mut ok = record("0");
        ok.output = Some("out".to_string());
        ok.score = Some(Score::Value(1.0));
        collector.push(ok);

        let mut failed = record("1");
        failed.error = Some(RecordError::example_processing("boom"));
        collector.push(failed);

        let mut unscored = record("2");
        unscored.output = Some("out".to_string());
        unscored.error = Some(RecordError::scoring("bad reference"));
        collector.push(unscored);

        collector.record_sink_failure();

        assert_eq!(collector.success_count(), 2);
        assert_eq!(collector.failure_count(), 1);

        let result = collector.finish(false);
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.scoring_failures, 1);
        assert_eq!(result.sink_failures, 1);
        assert!(!result.cancelled);
        assert_eq!(result.records[1].identifier, "1");
    }
}
