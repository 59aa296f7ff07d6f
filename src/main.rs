use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use turbidity::ingest::{batch, scanner};
use turbidity::utils::config::{self, Settings};
use turbidity::worker::stdio;

/// Classify water turbidity from photographs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file in KEY=VALUE form. Defaults to ./.env when present.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify image files or directories of images, one JSON line per file.
    Classify {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Hide the progress bar.
        #[arg(long)]
        no_progress: bool,
    },
    /// Serve JSON Lines requests on stdin, replies on stdout.
    Worker,
    /// Write the effective settings to an env file.
    InitConfig {
        #[arg(default_value = config::DEFAULT_ENV_FILE, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match config::load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings, args.verbose);

    match run(args.command, &settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout is reserved for results and worker replies.
fn init_logging(settings: &Settings, verbose: bool) {
    let fallback = if verbose { "debug" } else { settings.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Returns `Ok(false)` when the command ran but some inputs failed.
fn run(command: Command, settings: &Settings) -> Result<bool> {
    match command {
        Command::Classify { paths, no_progress } => {
            let images = scanner::collect_images(&paths);
            info!("Classifying {} image(s)", images.len());

            let reports = batch::classify_all(&images, settings, !no_progress);
            let failures = reports.iter().filter(|r| r.is_failure()).count();

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for report in &reports {
                serde_json::to_writer(&mut out, report).context("Failed to write report")?;
                writeln!(out)?;
            }
            out.flush()?;

            if failures > 0 {
                error!("{} of {} image(s) failed", failures, reports.len());
            }
            Ok(failures == 0)
        }
        Command::Worker => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            stdio::run(stdin.lock(), &mut stdout.lock(), settings)?;
            Ok(true)
        }
        Command::InitConfig { output } => {
            config::save_to_env(&output, settings)?;
            Ok(true)
        }
    }
}
