//! Report generation for evaluation results
//!
//! Generates reports in various formats (JSON, Markdown, terminal table).

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use crate::metrics::{EvaluationRecord, RecordErrorKind, RunResult};
use anyhow::Result;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Table,
}

impl ReportFormat {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "table" => Some(ReportFormat::Table),
            _ => None,
        }
    }
}

/// Generate a report in the specified format
pub fn generate_report(result: &RunResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(result),
        ReportFormat::Markdown => MarkdownReporter::generate(result),
        ReportFormat::Table => generate_table(result),
    }
}

/// Short status label of a record
pub(crate) fn status_label(record: &EvaluationRecord) -> &'static str {
    match record.error.as_ref().map(|e| e.kind) {
        Some(RecordErrorKind::ExampleProcessing) => "ERROR",
        Some(RecordErrorKind::Scoring) => "UNSCORED",
        None => "OK",
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Generate a simple table report for terminal output
fn generate_table(result: &RunResult) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Evaluation Results "));
    output.push_str(&format!(
        "Dataset: {} | Started: {}\n",
        result.dataset,
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "Succeeded: {}/{} ({:.1}%)\n",
        result.successes,
        result.total(),
        result.success_rate() * 100.0
    ));
    output.push_str(&format!("Failed: {}\n", result.failures));
    if result.scoring_failures > 0 {
        output.push_str(&format!("Unscored: {}\n", result.scoring_failures));
    }
    if result.sink_failures > 0 {
        output.push_str(&format!("Trace sink failures: {}\n", result.sink_failures));
    }
    if let Some(mean) = result.mean_score() {
        output.push_str(&format!("Mean Score: {:.3}\n", mean));
    }
    let pending = result.pending_count();
    if pending > 0 {
        output.push_str(&format!("Pending Scores: {}\n", pending));
    }
    output.push_str(&format!("Total Time: {:.1}s\n", result.total_time_secs));
    if result.cancelled {
        output.push_str("Run was cancelled; results are partial\n");
    }
    output.push('\n');

    output.push_str("EXAMPLES\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<20} {:>10} {:>10} {:>10}  {}\n",
        "Example", "Status", "Score", "Time", "Detail"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for record in &result.records {
        let score = record
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = record
            .error_message()
            .map(|e| truncate(e, 40))
            .unwrap_or_default();

        output.push_str(&format!(
            "{:<20} {:>10} {:>10} {:>8}ms  {}\n",
            truncate(&record.identifier, 20),
            status_label(record),
            score,
            record.elapsed_ms,
            detail
        ));
    }

    output.push_str(&format!("{:=<70}\n", ""));

    Ok(output)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metrics::{RecordError, Score};
    use chrono::Utc;

    pub(crate) fn sample_result() -> RunResult {
        RunResult {
            dataset: "summarizer".to_string(),
            records: vec![
                EvaluationRecord {
                    identifier: "0".to_string(),
                    input: "GaussMaster aggregates documents".to_string(),
                    expected_output: "aggregates".to_string(),
                    output: Some("It aggregates documents.".to_string()),
                    score: Some(Score::Value(1.0)),
                    error: None,
                    elapsed_ms: 850,
                },
                EvaluationRecord {
                    identifier: "1".to_string(),
                    input: "second".to_string(),
                    expected_output: String::new(),
                    output: None,
                    score: None,
                    error: Some(RecordError::example_processing("429 Too Many Requests")),
                    elapsed_ms: 120,
                },
            ],
            successes: 1,
            failures: 1,
            scoring_failures: 0,
            sink_failures: 0,
            cancelled: false,
            started_at: Utc::now(),
            total_time_secs: 1.2,
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::parse("MD"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::parse("table"), Some(ReportFormat::Table));
        assert_eq!(ReportFormat::parse("html"), None);
    }

    #[test]
    fn test_table_report() {
        let table = generate_report(&sample_result(), ReportFormat::Table).unwrap();

        assert!(table.contains("Succeeded: 1/2 (50.0%)"));
        assert!(table.contains("Mean Score: 1.000"));
        assert!(table.contains("429 Too Many Requests"));
        assert!(!table.contains("partial"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("привет мир", 6), "при...");
    }
}
