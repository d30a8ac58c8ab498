//! Evaluation configuration
//!
//! Configuration options for running evaluations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetSource;
use crate::error::{EvalError, EvalResult};
use crate::langfuse::LangfuseConfig;
use crate::llm::LlmConfig;
use crate::scoring::ScorerKind;

/// Where the dataset for a run comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetMode {
    /// Read `dataset_path`
    #[default]
    Local,
    /// Fetch `dataset_name` from the trace backend
    Remote,
}

/// Configuration for evaluation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Dataset mode
    #[serde(default)]
    pub mode: DatasetMode,

    /// Local dataset file
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,

    /// Remote dataset name
    #[serde(default)]
    pub dataset_name: Option<String>,

    /// Examples processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout per example in seconds
    #[serde(default)]
    pub example_timeout_secs: Option<u64>,

    /// Overall run deadline in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Whether to keep going after an example fails
    #[serde(default = "default_continue_on_failure")]
    pub continue_on_failure: bool,

    /// Mark unscored outputs as pending instead of leaving them unscored
    #[serde(default)]
    pub pending_score: bool,

    /// Built-in scorer
    #[serde(default)]
    pub scorer: ScorerKind,

    /// Whether to save the run result as JSON
    #[serde(default)]
    pub save_results: bool,

    /// Output directory for results
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Chat-completion settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Trace backend settings
    #[serde(default)]
    pub langfuse: LangfuseConfig,
}

fn default_concurrency() -> usize {
    1
}

fn default_continue_on_failure() -> bool {
    true
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            mode: DatasetMode::default(),
            dataset_path: None,
            dataset_name: None,
            concurrency: default_concurrency(),
            example_timeout_secs: None,
            deadline_secs: None,
            continue_on_failure: default_continue_on_failure(),
            pending_score: false,
            scorer: ScorerKind::default(),
            save_results: false,
            output_dir: None,
            llm: LlmConfig::default(),
            langfuse: LangfuseConfig::default(),
        }
    }
}

impl EvalConfig {
    /// Create a config reading a local dataset file
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: DatasetMode::Local,
            dataset_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Create a config fetching a remote dataset
    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            mode: DatasetMode::Remote,
            dataset_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Load from a JSON or YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::config(format!("Failed to read {:?}: {}", path, e)))?;

        if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            serde_yaml::from_str(&content)
                .map_err(|e| EvalError::config(format!("Failed to parse {:?}: {}", path, e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| EvalError::config(format!("Failed to parse {:?}: {}", path, e)))
        }
    }

    /// Fill credentials and endpoints from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Fill credentials and endpoints from a variable lookup
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(key) = lookup("LANGFUSE_PUBLIC_KEY") {
            self.langfuse.public_key = Some(key);
        }
        if let Some(key) = lookup("LANGFUSE_SECRET_KEY") {
            self.langfuse.secret_key = Some(key);
        }
        if let Some(host) = lookup("LANGFUSE_HOST") {
            self.langfuse.host = host;
        }
    }

    /// Set concurrency
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set per-example timeout
    pub fn with_example_timeout(mut self, secs: u64) -> Self {
        self.example_timeout_secs = Some(secs);
        self
    }

    /// Set overall deadline
    pub fn with_deadline(mut self, secs: u64) -> Self {
        self.deadline_secs = Some(secs);
        self
    }

    /// Set built-in scorer
    pub fn with_scorer(mut self, scorer: ScorerKind) -> Self {
        self.scorer = scorer;
        self
    }

    /// Mark unscored outputs as pending
    pub fn with_pending_score(mut self) -> Self {
        self.pending_score = true;
        self
    }

    /// Stop at the first failed example and return its error
    pub fn fail_fast(mut self) -> Self {
        self.continue_on_failure = false;
        self
    }

    /// Set output directory and enable saving
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self.save_results = true;
        self
    }

    /// Per-example timeout as a duration
    pub fn example_timeout(&self) -> Option<Duration> {
        self.example_timeout_secs.map(Duration::from_secs)
    }

    /// Overall deadline as a duration
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Dataset source selected by `mode`
    pub fn dataset_source(&self) -> EvalResult<DatasetSource> {
        match self.mode {
            DatasetMode::Local => self
                .dataset_path
                .clone()
                .map(DatasetSource::Local)
                .ok_or_else(|| EvalError::config("Local mode requires dataset_path")),
            DatasetMode::Remote => self
                .dataset_name
                .clone()
                .map(DatasetSource::Remote)
                .ok_or_else(|| EvalError::config("Remote mode requires dataset_name")),
        }
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> EvalResult<()> {
        if self.concurrency == 0 {
            return Err(EvalError::config("concurrency must be at least 1"));
        }
        if self.example_timeout_secs == Some(0) {
            return Err(EvalError::config("example_timeout_secs must be positive"));
        }
        if self.langfuse.batch_size == 0 {
            return Err(EvalError::config("langfuse.batch_size must be at least 1"));
        }
        self.dataset_source()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert_eq!(config.concurrency, 1);
        assert!(config.continue_on_failure);
        assert!(!config.pending_score);
        assert_eq!(config.scorer, ScorerKind::None);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_config_builder() {
        let config = EvalConfig::local("dataset.json")
            .with_concurrency(4)
            .with_example_timeout(30)
            .with_scorer(ScorerKind::Contains)
            .fail_fast();

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.example_timeout(), Some(Duration::from_secs(30)));
        assert!(!config.continue_on_failure);
        assert_eq!(
            config.dataset_source().unwrap(),
            DatasetSource::Local(PathBuf::from("dataset.json"))
        );
    }

    #[test]
    fn test_validate() {
        assert!(EvalConfig::local("d.json").validate().is_ok());
        assert!(EvalConfig::remote("summarizer").validate().is_ok());
        assert!(EvalConfig::default().validate().is_err());
        assert!(
            EvalConfig::local("d.json")
                .with_concurrency(0)
                .validate()
                .is_err()
        );

        let mut config = EvalConfig::default();
        config.mode = DatasetMode::Remote;
        assert!(matches!(config.validate(), Err(EvalError::Config(_))));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "mode: remote\ndataset_name: summarizer\nscorer: contains\nllm:\n  model: gpt-4o-mini\n"
        )
        .unwrap();

        let config = EvalConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.mode, DatasetMode::Remote);
        assert_eq!(config.scorer, ScorerKind::Contains);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("LANGFUSE_PUBLIC_KEY", "pk-lf"),
            ("LANGFUSE_SECRET_KEY", "sk-lf"),
            ("LANGFUSE_HOST", "http://localhost:3000"),
        ]
        .into_iter()
        .collect();

        let mut config = EvalConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.langfuse.public_key.as_deref(), Some("pk-lf"));
        assert_eq!(config.langfuse.host, "http://localhost:3000");
        assert_eq!(config.llm.base_url, LlmConfig::default().base_url);
    }
}
