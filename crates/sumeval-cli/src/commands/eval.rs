//! Evaluation commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use sumeval_core::dataset::{DatasetClient, DatasetLoader};
use sumeval_core::langfuse::{LangfuseClient, LangfuseSink};
use sumeval_core::llm::{OpenAiClient, Summarizer};
use sumeval_core::report::{JsonReporter, ReportFormat, generate_report};
use sumeval_core::runner::{DatasetMode, EvalConfig, EvalHarness, EvalProgress};
use sumeval_core::scoring::ScorerKind;
use sumeval_core::trace::{FanoutSink, JsonlSink, RecordSink, TracingSink};
use sumeval_core::{DatasetSource, RunResult};

use crate::args::{RunArgs, SinkKind};
use crate::signal_handler;

/// Dataset run name used for remote datasets when none is configured
const DEFAULT_RUN_NAME: &str = "summary-eval-run";

/// Merge the configuration file, environment and flags
pub fn build_config(args: &RunArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::load_from_file(path)?,
        None => EvalConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(path) = &args.dataset {
        config.mode = DatasetMode::Local;
        config.dataset_path = Some(path.clone());
    }
    if let Some(name) = &args.remote {
        config.mode = DatasetMode::Remote;
        config.dataset_name = Some(name.clone());
    }
    if let Some(scorer) = &args.scorer {
        config.scorer = ScorerKind::parse(scorer)
            .ok_or_else(|| anyhow!("Unknown scorer '{}' (expected none, contains, exact)", scorer))?;
    }
    if args.pending_score {
        config.pending_score = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(secs) = args.timeout {
        config.example_timeout_secs = Some(secs);
    }
    if let Some(secs) = args.deadline {
        config.deadline_secs = Some(secs);
    }
    if args.fail_fast {
        config.continue_on_failure = false;
    }
    if let Some(run_name) = &args.run_name {
        config.langfuse.run_name = Some(run_name.clone());
    }
    if config.mode == DatasetMode::Remote && config.langfuse.run_name.is_none() {
        config.langfuse.run_name = Some(DEFAULT_RUN_NAME.to_string());
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(dir) = &args.output {
        config.output_dir = Some(dir.clone());
        config.save_results = true;
    }

    config.validate()?;
    Ok(config)
}

/// Run an evaluation
pub async fn run(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let source = config.dataset_source()?;
    let format = ReportFormat::parse(&args.format).unwrap_or(ReportFormat::Table);

    let sinks = if args.sinks.is_empty() {
        vec![SinkKind::Tracing]
    } else {
        args.sinks.clone()
    };

    let needs_langfuse =
        config.mode == DatasetMode::Remote || sinks.contains(&SinkKind::Langfuse);
    let langfuse = if needs_langfuse {
        Some(Arc::new(LangfuseClient::connect(config.langfuse.clone()).await?))
    } else {
        None
    };

    let chat = Arc::new(OpenAiClient::new(config.llm.clone())?);
    let summarizer = Summarizer::new(chat).with_system_prompt(config.llm.system_prompt.clone());
    let scorer = config.scorer.build();

    let mut fanout = FanoutSink::new();
    for kind in &sinks {
        match kind {
            SinkKind::Tracing => fanout.push(Box::new(TracingSink)),
            SinkKind::Jsonl => fanout.push(Box::new(JsonlSink::new(&args.jsonl_path))),
            SinkKind::Langfuse => {
                let client = langfuse
                    .clone()
                    .ok_or_else(|| anyhow!("Langfuse sink requires Langfuse credentials"))?;
                let dataset = match &source {
                    DatasetSource::Local(path) => path.display().to_string(),
                    DatasetSource::Remote(name) => name.clone(),
                };
                let mut sink = LangfuseSink::new(client)
                    .with_dataset(dataset)
                    .with_model(config.llm.model.clone())
                    .with_system_prompt(config.llm.system_prompt.clone());
                if let Some(scorer) = &scorer {
                    sink = sink.with_score_name(scorer.name());
                }
                // Only remote item ids can be linked to a dataset run.
                if config.mode == DatasetMode::Local {
                    sink = sink.with_run_name(None);
                }
                fanout.push(Box::new(sink));
            }
        }
    }

    let mut harness = EvalHarness::new(config);
    harness.set_progress_callback(Box::new(|progress: EvalProgress| {
        eprintln!(
            "[{}/{}] example {}",
            progress.current + 1,
            progress.total,
            progress.identifier
        );
    }));
    let _signals = signal_handler::cancel_on_interrupt(harness.cancellation_token())?;

    eprintln!("Starting evaluation ({})...\n", source.describe());

    let client = langfuse.as_deref().map(|c| c as &dyn DatasetClient);
    let result = harness
        .run_source(
            &source,
            client,
            &summarizer,
            scorer.as_deref(),
            Some(&fanout as &dyn RecordSink),
        )
        .await
        .inspect_err(|e| {
            if e.is_fatal() {
                tracing::error!(error = %e, "Evaluation aborted");
            }
        })?;

    println!("{}", generate_report(&result, format)?);
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &RunResult) {
    let line = format!(
        "Evaluation complete: {}/{} examples succeeded ({:.1}%)",
        result.successes,
        result.total(),
        result.success_rate() * 100.0
    );
    if result.failures == 0 {
        println!("\n{}", line.green());
    } else {
        println!("\n{}", line.yellow());
    }
    if result.cancelled {
        println!("{}", "Run was cancelled before the end of the dataset".yellow());
    }
}

/// Load a dataset file and report its size
pub fn validate(path: &Path) -> Result<()> {
    let dataset = DatasetLoader::new(path).load()?;
    let with_reference = dataset.iter().filter(|e| e.has_reference()).count();

    println!(
        "{} {}: {} examples ({} with reference output)",
        "OK".green(),
        path.display(),
        dataset.len(),
        with_reference
    );
    Ok(())
}

/// Show evaluation report from a previous run
pub async fn report(input: PathBuf, format: String) -> Result<()> {
    let content = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("Failed to read {:?}", input))?;
    let result: RunResult = JsonReporter::parse(&content)?;

    let report_format = ReportFormat::parse(&format).unwrap_or(ReportFormat::Table);
    println!("{}", generate_report(&result, report_format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["sumeval", "run"];
        full.extend_from_slice(argv);
        match crate::args::Cli::try_parse_from(full).unwrap().command {
            crate::args::Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_build_config_from_flags() {
        let args = run_args(&[
            "--dataset",
            "dataset.json",
            "--scorer",
            "contains",
            "--concurrency",
            "3",
            "--fail-fast",
            "--pending-score",
        ]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.mode, DatasetMode::Local);
        assert_eq!(config.dataset_path, Some(PathBuf::from("dataset.json")));
        assert_eq!(config.scorer, ScorerKind::Contains);
        assert_eq!(config.concurrency, 3);
        assert!(!config.continue_on_failure);
        assert!(config.pending_score);
    }

    #[test]
    fn test_build_config_rejects_unknown_scorer() {
        let args = run_args(&["--dataset", "d.json", "--scorer", "bleu"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_build_config_requires_dataset() {
        let args = run_args(&[]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_validate_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, r#"[{"input": "a", "expectedOutput": "b"}]"#).unwrap();
        assert!(validate(&path).is_ok());

        std::fs::write(&path, r#"[{"expectedOutput": "b"}]"#).unwrap();
        assert!(validate(&path).is_err());
    }
}
