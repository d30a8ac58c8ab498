//! Error types for sumeval

use thiserror::Error;

/// Result type alias for harness operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Main error type for sumeval
///
/// Only [`EvalError::DatasetLoad`] aborts a run on its own. Per-example
/// failures are captured in the run's records and only surface as
/// [`EvalError::ExampleProcessing`] when the caller disabled
/// `continue_on_failure`.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// The dataset source is missing or malformed
    #[error("Dataset load error: {0}")]
    DatasetLoad(String),

    /// The unit of work failed for one example
    #[error("Example {identifier} failed: {message}")]
    ExampleProcessing { identifier: String, message: String },

    /// The scorer could not produce a value
    #[error("Scoring failed for example {identifier}: {message}")]
    Scoring { identifier: String, message: String },

    /// The trace sink rejected a record
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat-completion client errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),
}

impl EvalError {
    /// Create a new dataset load error
    pub fn dataset_load(message: impl Into<String>) -> Self {
        Self::DatasetLoad(message.into())
    }

    /// Create a new example processing error
    pub fn example(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExampleProcessing {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create a new scoring error
    pub fn scoring(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scoring {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create a new sink error
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Whether this error aborts a run before any example is processed
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DatasetLoad(_) | Self::Config(_))
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::example("3", "connection reset");
        assert_eq!(err.to_string(), "Example 3 failed: connection reset");

        let err = EvalError::dataset_load("element 2 has no input");
        assert_eq!(
            err.to_string(),
            "Dataset load error: element 2 has no input"
        );
    }

    #[test]
    fn test_scoring_error_names_example() {
        let err = EvalError::scoring("7", "reference is empty");
        assert_eq!(
            err.to_string(),
            "Scoring failed for example 7: reference is empty"
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(EvalError::dataset_load("x").is_fatal());
        assert!(EvalError::config("x").is_fatal());
        assert!(!EvalError::sink("x").is_fatal());
        assert!(!EvalError::scoring("1", "x").is_fatal());
    }
}
