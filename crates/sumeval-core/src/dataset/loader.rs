//! Dataset loading from JSON/YAML files
//!
//! A dataset file is a sequence of objects, each with a required `input`
//! and an optional `expectedOutput` (or `expected_output`; when both are
//! present `expectedOutput` wins). Any structural problem fails the whole
//! load before a single example is processed.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::{Dataset, DatasetOrigin, Example};
use crate::error::{EvalError, EvalResult};

/// One element of a dataset file as written on disk
#[derive(Debug, Deserialize)]
struct RawExample {
    input: String,

    #[serde(default, rename = "expectedOutput")]
    expected_output_camel: Option<String>,

    #[serde(default)]
    expected_output: Option<String>,
}

impl RawExample {
    fn into_example(self, identifier: String) -> Example {
        let expected = self.expected_output_camel.or(self.expected_output);
        Example::new(identifier, self.input).with_expected(expected.unwrap_or_default())
    }
}

/// Loader for local dataset files
pub struct DatasetLoader {
    path: PathBuf,
}

impl DatasetLoader {
    /// Create a loader for the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the whole file
    pub fn load(&self) -> EvalResult<Dataset> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            EvalError::dataset_load(format!("Failed to read {:?}: {}", self.path, e))
        })?;

        let name = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset")
            .to_string();

        let document = if Self::is_yaml(&self.path) {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
                EvalError::dataset_load(format!("Failed to parse YAML {:?}: {}", self.path, e))
            })?;
            serde_json::to_value(yaml).map_err(|e| {
                EvalError::dataset_load(format!("Unsupported YAML in {:?}: {}", self.path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                EvalError::dataset_load(format!("Failed to parse JSON {:?}: {}", self.path, e))
            })?
        };

        let examples = parse_examples(document)?;
        tracing::debug!(path = ?self.path, count = examples.len(), "Loaded local dataset");

        Ok(Dataset::new(name, DatasetOrigin::Local, examples))
    }

    fn is_yaml(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
    }
}

/// Load a dataset from a JSON string (useful for testing)
pub fn load_dataset_from_json(name: &str, json: &str) -> EvalResult<Dataset> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| EvalError::dataset_load(format!("Failed to parse JSON: {}", e)))?;
    Ok(Dataset::new(name, DatasetOrigin::Local, parse_examples(document)?))
}

fn parse_examples(document: Value) -> EvalResult<Vec<Example>> {
    let Value::Array(items) = document else {
        return Err(EvalError::dataset_load(
            "Dataset must be a sequence of objects",
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            if !item.is_object() {
                return Err(EvalError::dataset_load(format!(
                    "Element {} is not an object",
                    idx
                )));
            }
            let raw: RawExample = serde_json::from_value(item).map_err(|e| {
                EvalError::dataset_load(format!("Element {} is invalid: {}", idx, e))
            })?;
            Ok(raw.into_example(idx.to_string()))
        })
        .collect()
}
