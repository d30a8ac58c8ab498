//! Evaluation example and dataset definitions

use serde::{Deserialize, Serialize};

/// One evaluation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Index for local sets, item id for remote sets
    pub identifier: String,

    /// Text handed to the unit of work
    pub input: String,

    /// Reference output; empty means "no ground truth"
    #[serde(default)]
    pub expected_output: String,
}

impl Example {
    /// Create a new example
    pub fn new(identifier: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            input: input.into(),
            expected_output: String::new(),
        }
    }

    /// Set the reference output
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = expected.into();
        self
    }

    /// Whether the example carries a reference output
    pub fn has_reference(&self) -> bool {
        !self.expected_output.is_empty()
    }
}

/// Where a dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetOrigin {
    /// Structured file on disk
    Local,
    /// Named collection fetched through a [`super::DatasetClient`]
    Remote,
}

/// Ordered collection of examples, loaded in full before a run starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name (file stem for local sets)
    pub name: String,

    /// Source kind
    pub origin: DatasetOrigin,

    /// Examples in evaluation order
    pub examples: Vec<Example>,
}

impl Dataset {
    /// Create a dataset from already-built examples
    pub fn new(name: impl Into<String>, origin: DatasetOrigin, examples: Vec<Example>) -> Self {
        Self {
            name: name.into(),
            origin,
            examples,
        }
    }

    /// Build a local dataset from `(input, expected_output)` pairs, using
    /// the position as identifier
    pub fn from_pairs<I, S, T>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let examples = pairs
            .into_iter()
            .enumerate()
            .map(|(idx, (input, expected))| {
                Example::new(idx.to_string(), input).with_expected(expected)
            })
            .collect();
        Self::new(name, DatasetOrigin::Local, examples)
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dataset has no examples
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Iterate over examples in order
    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }
}

impl IntoIterator for Dataset {
    type Item = Example;
    type IntoIter = std::vec::IntoIter<Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.into_iter()
    }
}
