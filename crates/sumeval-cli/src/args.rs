//! CLI argument definitions using clap
//!
//! - sumeval run --dataset dataset.json     # Evaluate a local dataset
//! - sumeval run --remote summarizer        # Evaluate a Langfuse dataset
//! - sumeval validate dataset.json          # Check a dataset file
//! - sumeval report eval_results_*.json     # Render a saved result

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sumeval")]
#[command(about = "Run LLM summarization datasets and log traces and scores")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an evaluation over a dataset
    Run(RunArgs),

    /// Load a local dataset file and report how many examples it holds
    Validate {
        /// Dataset file (JSON or YAML)
        path: PathBuf,
    },

    /// Render a saved evaluation result
    Report {
        /// Result file written by `run --output`
        input: PathBuf,

        /// Output format: table, json, markdown
        #[arg(long, default_value = "table")]
        format: String,
    },
}

/// Trace sink selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Structured log event per example
    Tracing,
    /// Append records to a JSON Lines file
    Jsonl,
    /// Send traces and scores to Langfuse
    Langfuse,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file (JSON or YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local dataset file
    #[arg(long, conflicts_with = "remote")]
    pub dataset: Option<PathBuf>,

    /// Remote dataset name
    #[arg(long)]
    pub remote: Option<String>,

    /// Scorer: none, contains, exact
    #[arg(long)]
    pub scorer: Option<String>,

    /// Mark unscored outputs as pending
    #[arg(long)]
    pub pending_score: bool,

    /// Examples processed at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Timeout per example in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Overall deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Stop at the first failed example
    #[arg(long)]
    pub fail_fast: bool,

    /// Trace sinks (repeatable); defaults to tracing
    #[arg(long = "sink", value_enum)]
    pub sinks: Vec<SinkKind>,

    /// File for the jsonl sink
    #[arg(long, default_value = "traces.jsonl")]
    pub jsonl_path: PathBuf,

    /// Langfuse dataset run to link remote traces to
    #[arg(long)]
    pub run_name: Option<String>,

    /// Chat-completion model
    #[arg(long)]
    pub model: Option<String>,

    /// Output format: table, json, markdown
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Directory to save the run result in
    #[arg(long)]
    pub output: Option<PathBuf>,
}
