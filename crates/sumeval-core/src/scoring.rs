//! Scorers comparing a unit of work's output against the reference
//!
//! Scorers are pure and synchronous. Returning an error leaves the record
//! unscored without affecting the rest of the run.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Function scoring one output
pub trait Scorer: Send + Sync {
    /// Name used when reporting the score to a trace backend
    fn name(&self) -> &str;

    /// Score `output` for `input` against `expected`
    fn score(&self, input: &str, output: &str, expected: &str) -> Result<f64>;
}

/// 1.0 when the reference text occurs in the output, 0.0 otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsReference;

impl Scorer for ContainsReference {
    fn name(&self) -> &str {
        "contains-reference"
    }

    fn score(&self, _input: &str, output: &str, expected: &str) -> Result<f64> {
        // An empty reference is contained in everything.
        if expected.is_empty() {
            bail!("example has no reference output");
        }
        Ok(if output.contains(expected) { 1.0 } else { 0.0 })
    }
}

/// 1.0 when output and reference match ignoring case and surrounding whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl Scorer for ExactMatch {
    fn name(&self) -> &str {
        "exact-match"
    }

    fn score(&self, _input: &str, output: &str, expected: &str) -> Result<f64> {
        let matched = output.trim().to_lowercase() == expected.trim().to_lowercase();
        Ok(if matched { 1.0 } else { 0.0 })
    }
}

/// Scorer backed by a closure
pub struct FnScorer<F> {
    name: String,
    func: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&str, &str, &str) -> Result<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&str, &str, &str) -> Result<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, input: &str, output: &str, expected: &str) -> Result<f64> {
        (self.func)(input, output, expected)
    }
}

/// Built-in scorer selection for configuration files and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// No scoring
    #[default]
    None,
    /// [`ContainsReference`]
    Contains,
    /// [`ExactMatch`]
    Exact,
}

impl ScorerKind {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(ScorerKind::None),
            "contains" | "contains-reference" => Some(ScorerKind::Contains),
            "exact" | "exact-match" => Some(ScorerKind::Exact),
            _ => None,
        }
    }

    /// Instantiate the scorer, `None` for [`ScorerKind::None`]
    pub fn build(self) -> Option<Box<dyn Scorer>> {
        match self {
            ScorerKind::None => None,
            ScorerKind::Contains => Some(Box::new(ContainsReference)),
            ScorerKind::Exact => Some(Box::new(ExactMatch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_reference() {
        let scorer = ContainsReference;
        assert_eq!(
            scorer
                .score("in", "GaussMaster aggregates documents", "aggregates")
                .unwrap(),
            1.0
        );
        assert_eq!(scorer.score("in", "nothing", "aggregates").unwrap(), 0.0);
        assert!(scorer.score("in", "anything", "").is_err());
    }

    #[test]
    fn test_exact_match() {
        let scorer = ExactMatch;
        assert_eq!(scorer.score("A", " a ", "A").unwrap(), 1.0);
        assert_eq!(scorer.score("A", "a", "X").unwrap(), 0.0);
    }

    #[test]
    fn test_fn_scorer() {
        let scorer = FnScorer::new("len", |_: &str, out: &str, _: &str| Ok(out.len() as f64));
        assert_eq!(scorer.name(), "len");
        assert_eq!(scorer.score("", "abc", "").unwrap(), 3.0);
    }

    #[test]
    fn test_scorer_kind() {
        assert_eq!(ScorerKind::parse("Contains"), Some(ScorerKind::Contains));
        assert_eq!(ScorerKind::parse("exact-match"), Some(ScorerKind::Exact));
        assert_eq!(ScorerKind::parse("bleu"), None);
        assert!(ScorerKind::None.build().is_none());
        assert_eq!(ScorerKind::Exact.build().unwrap().name(), "exact-match");
    }
}
