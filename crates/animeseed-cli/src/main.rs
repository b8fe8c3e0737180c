mod registry;
mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use uuid::Uuid;

use animeseed_core::CATALOG_VERSION;
use animeseed_extract::{ExtractError, ExtractOptions, ExtractionReport, SeedEngine};
use registry::{RunContext, init_run_logging, start_run, write_report};
use settings::{Settings, SettingsError};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "animeseed",
    version,
    about = "Extract a referentially consistent anime seed subset"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample anchor anime and write the numbered seed SQL files.
    Generate(GenerateArgs),
    /// Print the JSON Schema of report.json.
    ReportSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of anchor anime; prompted for when omitted.
    #[arg(long = "n", value_name = "N")]
    sample_size: Option<usize>,
    /// Run seed; a random seed is drawn and reported when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of app users to sample (defaults to N).
    #[arg(long, value_name = "M")]
    app_users: Option<usize>,
    /// Settings file (defaults to ./animeseed.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the source dataset CSVs.
    #[arg(long)]
    datasets_dir: Option<PathBuf>,
    /// Directory holding the lookup CSVs and the anchor pool.
    #[arg(long)]
    lookups_dir: Option<PathBuf>,
    /// Directory receiving the seed SQL files.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Directory for run artifacts.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Disable progress bars.
    #[arg(long, default_value_t = false)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::ReportSchema => print_report_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let settings = Settings::load(args.config.as_deref())?;

    let sample_size = match args.sample_size.or(settings.sample_size) {
        Some(value) => value,
        None => prompt_sample_size(io::stdin().lock(), io::stderr())?,
    };
    let run_dir = args
        .run_dir
        .clone()
        .or_else(|| settings.run_dir.clone())
        .unwrap_or_else(|| PathBuf::from("runs"));
    let run_id = Uuid::new_v4().to_string();
    let options = build_options(&args, settings, sample_size, run_id.clone());

    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        catalog_version: CATALOG_VERSION.to_string(),
        run_dir,
        options: options.clone(),
    };
    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        run_root = %run_paths.root.display(),
        sample_size = options.sample_size
    );

    let result = match SeedEngine::new(options).run() {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(event = "run_finished", status = "failed", error = %err);
            return Err(err.into());
        }
    };

    write_report(&run_paths, &result.report)?;
    tracing::info!(
        event = "run_finished",
        status = "success",
        seed = result.report.seed,
        out_dir = %result.out_dir.display(),
        report = %run_paths.report_path.display(),
        duration_ms = result.report.duration_ms
    );

    Ok(())
}

/// Merge flags over settings-file values into engine options.
fn build_options(
    args: &GenerateArgs,
    settings: Settings,
    sample_size: usize,
    run_id: String,
) -> ExtractOptions {
    let defaults = ExtractOptions::default();
    let mut layout = settings.layout;
    if let Some(dir) = &args.datasets_dir {
        layout.datasets_dir = dir.clone();
    }
    if let Some(dir) = &args.lookups_dir {
        layout.lookups_dir = dir.clone();
    }

    ExtractOptions {
        sample_size,
        seed: args.seed.or(settings.seed),
        app_user_count: args.app_users.or(settings.app_users),
        app_user_seed_offset: settings
            .app_user_seed_offset
            .unwrap_or(defaults.app_user_seed_offset),
        layout,
        out_dir: args
            .out_dir
            .clone()
            .or(settings.out_dir)
            .unwrap_or(defaults.out_dir),
        progress: !args.no_progress && settings.progress.unwrap_or(true),
        run_id: Some(run_id),
        ..defaults
    }
}

/// Ask for a positive sample size until one is given.
fn prompt_sample_size<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<usize> {
    loop {
        write!(output, "Number of anime to sample: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no sample size given",
            ));
        }
        match line.trim().parse::<usize>() {
            Ok(value) if value > 0 => return Ok(value),
            _ => writeln!(output, "Please enter a positive integer.")?,
        }
    }
}

fn print_report_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(ExtractionReport);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
