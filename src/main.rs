use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use safeops_artifact::{RunContext, TEMP_DIR_NAME};
use safeops_config::Settings;
use safeops_engine::{LineNotifier, WorkflowEngine};
use safeops_resolver::RunInputs;
use safeops_steps::builtin_registry;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "SAFEOPS_LOG";

/// SafeOps - governance analysis pipelines for codebases
#[derive(Parser)]
#[command(name = "safeops")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the settings file
  #[arg(long, global = true, default_value = ".safeops/config.yml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow against a codebase
  Run(RunArgs),

  /// List the registered step identifiers
  Steps,
}

#[derive(clap::Args)]
struct RunArgs {
  /// Workflow name (looked up in the workflows directory) or path to a JSON file
  workflow: String,

  /// Path to the codebase to analyze
  path: PathBuf,

  /// Write the run log and step artifacts to the log directory
  #[arg(long)]
  enable_local_logs: bool,

  /// The directory to store logs
  #[arg(long)]
  log_dir: Option<PathBuf>,

  /// Directory searched for `<workflow>.json` (default: ./workflows)
  #[arg(long)]
  workflows_dir: Option<PathBuf>,

  /// Extra run input, as KEY=VALUE. VALUE is parsed as JSON when possible
  #[arg(long = "input", value_name = "KEY=VALUE", value_parser = parse_input)]
  inputs: Vec<(String, Value)>,

  /// Remove the ephemeral run directory when the run ends
  #[arg(long)]
  clean_artifacts: bool,
}

fn parse_input(raw: &str) -> Result<(String, Value), String> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
  if key.is_empty() {
    return Err(format!("empty input name in '{}'", raw));
  }
  let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
  Ok((key.to_string(), value))
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Diagnostics go to stderr so they never mix with protocol lines on stdout.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();

  let result = match cli.command {
    Some(Commands::Run(args)) => run(args, &cli.config),
    Some(Commands::Steps) => {
      list_steps();
      Ok(ExitCode::SUCCESS)
    }
    None => {
      println!("safeops - use --help to see available commands");
      Ok(ExitCode::SUCCESS)
    }
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      eprintln!("Error: {:#}", e);
      ExitCode::FAILURE
    }
  }
}

fn list_steps() {
  for id in builtin_registry().ids() {
    println!("{}", id);
  }
}

fn run(args: RunArgs, config: &Path) -> Result<ExitCode> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_async(args, config).await })
}

async fn run_async(args: RunArgs, config: &Path) -> Result<ExitCode> {
  let settings = Settings::load(config)
    .await
    .with_context(|| format!("failed to load settings: {}", config.display()))?;

  let workflow_file = workflow_file(&args, &settings);
  if !workflow_file.exists() {
    eprintln!("Error: Workflow file not found at {}", workflow_file.display());
    return Ok(ExitCode::FAILURE);
  }

  let temp_root = match &settings.temp_root {
    Some(root) => root.clone(),
    None => std::env::current_dir().context("failed to determine current directory")?,
  };
  let log_dir = log_dir(&args, &settings, &temp_root);

  let mut inputs = RunInputs::new();
  inputs.insert(
    "path".to_string(),
    Value::String(args.path.to_string_lossy().into_owned()),
  );
  for (key, value) in args.inputs {
    if key == "path" {
      bail!("the 'path' input is set by the positional argument");
    }
    inputs.insert(key, value);
  }

  let engine = WorkflowEngine::new(Arc::new(builtin_registry()));
  let mut context = RunContext::new(&temp_root, log_dir);
  debug!(
    workflow = %workflow_file.display(),
    run_id = %context.run_id(),
    output_dir = %context.output_dir().display(),
    "starting run"
  );

  let notifier = LineNotifier::stdio();
  let result = engine
    .run_file(&workflow_file, &inputs, &mut context, &notifier)
    .await;

  if args.clean_artifacts {
    if let Err(error) = context.cleanup().await {
      warn!(%error, "failed to remove run artifacts");
    }
  }

  // The failure has already been reported on stderr as WORKFLOW_ERROR.
  Ok(match result {
    Ok(_) => ExitCode::SUCCESS,
    Err(_) => ExitCode::FAILURE,
  })
}

/// A workflow argument naming an existing file or ending in `.json` is a
/// path; anything else is a name looked up in the workflows directory.
fn workflow_file(args: &RunArgs, settings: &Settings) -> PathBuf {
  let as_path = PathBuf::from(&args.workflow);
  if as_path.is_file() || as_path.extension().is_some_and(|ext| ext == "json") {
    return as_path;
  }

  args
    .workflows_dir
    .clone()
    .or_else(|| settings.workflows_dir.clone())
    .unwrap_or_else(|| PathBuf::from("workflows"))
    .join(format!("{}.json", args.workflow))
}

/// The persistent log directory, if local logs are enabled by flag or
/// settings. Defaults to `<temp_root>/.safeops/logs`.
fn log_dir(args: &RunArgs, settings: &Settings, temp_root: &Path) -> Option<PathBuf> {
  settings
    .clone()
    .with_log_overrides(args.enable_local_logs, args.log_dir.clone())
    .log_dir_or(|| temp_root.join(TEMP_DIR_NAME).join("logs"))
}
