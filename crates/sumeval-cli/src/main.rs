//! sumeval command-line application
//!
//! Runs a summarizer over a dataset and logs one trace per example.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/sumeval-cli
//! ```
//!
//! Credentials are read from the environment (a `.env` file is honoured):
//! `OPENAI_API_KEY`, `LANGFUSE_PUBLIC_KEY`, `LANGFUSE_SECRET_KEY`,
//! `LANGFUSE_HOST`.

mod args;
mod commands;
mod signal_handler;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Run(args) => commands::eval::run(args).await,
        Commands::Validate { path } => commands::eval::validate(&path),
        Commands::Report { input, format } => commands::eval::report(input, format).await,
    }
}

/// Initialize logging with environment-based filtering
///
/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is info.
fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
