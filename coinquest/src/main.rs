//! `coinquest` runs engine commands against a JSON fixture of server records.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/coinquest/config.toml`). Output is a JSON document on stdout.
//!
//! ```bash
//! # Overview of wallet, rooms and wishes
//! cargo run --bin coinquest -- --fixture fixture.json
//!
//! # Last week's tasks, as seen from a fixed date
//! cargo run --bin coinquest -- --fixture fixture.json --today 2025-05-14 week --offset -1
//!
//! # Complete a task and persist the result
//! cargo run --bin coinquest -- --fixture fixture.json --save complete 3
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use coinquest::app::{self, App};
use coinquest::config::{AppConfig, CliArgs};
use coinquest::remote::memory::MemoryRemote;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::default()
        }
    };

    // Logs go to a file so stdout carries only the JSON result.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("coinquest starting");

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("coinquest.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Loads the fixture, runs the command and prints its result.
async fn run(cli: &CliArgs, config: AppConfig) -> Result<(), app::AppError> {
    let fixture = config.fixture_path.clone();
    let remote = match fixture.as_deref() {
        Some(path) => app::load_fixture(path)?,
        None => {
            tracing::warn!("no fixture configured; starting from an empty server");
            MemoryRemote::new()
        }
    };

    let today = chrono::Local::now().date_naive();
    let mut app = App::open(remote, config, today).await?;
    let output = app.run(cli.command.as_ref()).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    let mutated = cli.command.as_ref().is_some_and(|c| c.is_mutation());
    match (cli.save && mutated, fixture.as_deref()) {
        (true, Some(path)) => app::save_fixture(path, app.remote())?,
        (true, None) => tracing::warn!("--save given without a fixture; nothing written"),
        (false, _) => {}
    }

    tracing::info!("coinquest exiting");
    Ok(())
}
