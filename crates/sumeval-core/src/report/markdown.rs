//! Markdown report generation

use anyhow::Result;

use super::{status_label, truncate};
use crate::metrics::RunResult;

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(result: &RunResult) -> Result<String> {
        let mut md = String::new();

        md.push_str("# Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Dataset**: {}\n", result.dataset));
        md.push_str(&format!(
            "- **Started**: {}\n",
            result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!(
            "- **Total Execution Time**: {:.1}s\n",
            result.total_time_secs
        ));
        if result.cancelled {
            md.push_str("- **Cancelled**: yes, results are partial\n");
        }
        md.push('\n');

        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Examples | {} |\n", result.total()));
        md.push_str(&format!(
            "| Successes | {} ({:.1}%) |\n",
            result.successes,
            result.success_rate() * 100.0
        ));
        md.push_str(&format!("| Failures | {} |\n", result.failures));
        md.push_str(&format!(
            "| Scoring Failures | {} |\n",
            result.scoring_failures
        ));
        md.push_str(&format!("| Sink Failures | {} |\n", result.sink_failures));
        match result.mean_score() {
            Some(mean) => md.push_str(&format!("| Mean Score | {:.3} |\n", mean)),
            None => md.push_str("| Mean Score | n/a |\n"),
        }
        md.push_str(&format!("| Pending Scores | {} |\n\n", result.pending_count()));

        md.push_str("## Examples\n\n");
        md.push_str("| Example | Status | Score | Time (ms) | Detail |\n");
        md.push_str("|---------|--------|-------|-----------|--------|\n");

        for record in &result.records {
            let score = record
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            let detail = record
                .error_message()
                .or(record.output.as_deref())
                .map(|d| truncate(d, 60).replace('|', "\\|").replace('\n', " "))
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                record.identifier,
                status_label(record),
                score,
                record.elapsed_ms,
                detail
            ));
        }

        Ok(md)
    }
}
