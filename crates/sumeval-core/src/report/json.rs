//! JSON report generation

use anyhow::Result;

use crate::metrics::RunResult;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(result: &RunResult) -> Result<String> {
        let json = serde_json::to_string_pretty(result)?;
        Ok(json)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(result: &RunResult) -> Result<String> {
        let json = serde_json::to_string(result)?;
        Ok(json)
    }

    /// Read a result previously written as JSON
    pub fn parse(json: &str) -> Result<RunResult> {
        let result = serde_json::from_str(json)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_result;

    #[test]
    fn test_json_generation() {
        let result = sample_result();
        let json = JsonReporter::generate(&result).unwrap();

        assert!(json.contains("\"dataset\": \"summarizer\""));
        assert!(json.contains("\"successes\": 1"));

        let parsed =
            JsonReporter::parse(&JsonReporter::generate_compact(&result).unwrap()).unwrap();
        assert_eq!(parsed.records.len(), result.records.len());
    }
}
