//! daynote - Main entry point.
//!
//! Creates today's note, keeps it rolling over every night and accepts text
//! to append to it over HTTP.
//!
//! # Configuration
//!
//! See [`daynote_server::config`] and [`daynote_journal::config`] for
//! environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! # Create today's note and clean up yesterday's
//! daynote run-once
//!
//! # Scheduler plus append endpoint, JSON logs
//! DAYNOTE_LOG_FORMAT=json daynote serve-both
//!
//! # Append from a pipe
//! echo "call the plumber" | daynote append
//! ```

use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use daynote_journal::{Clock, DailySchedule, Journal, Scheduler, SchedulerHandle, SystemClock};
use daynote_server::client::AppendClient;
use daynote_server::config::{Config, LogFormat};
use daynote_server::routes::{self, AppState, AppendStatus};

/// daynote - daily notes with carried-forward to-dos.
///
/// Creates a note per day under a year/month hierarchy, carries unfinished
/// to-dos forward and removes notes that held nothing else.
#[derive(Parser, Debug)]
#[command(name = "daynote")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    DAYNOTE_ROOT         Journal root directory (default: ~/ll)
    DAYNOTE_EXTENSION    Note file extension (default: md)
    DAYNOTE_SCHEDULE_AT  Local time of the daily job, HH:MM (default: 00:10)
    DAYNOTE_POLL_SECS    Scheduler polling interval in seconds (default: 60)
    DAYNOTE_PORT         Append endpoint port (default: 8765)
    DAYNOTE_BIND         Append endpoint bind address (default: 127.0.0.1)
    DAYNOTE_LOG_FORMAT   pretty or json (default: pretty)
    RUST_LOG             Log filter (default: info)

EXAMPLES:
    # Create today's note now
    daynote run-once

    # Keep notes rolling over and accept appends
    daynote serve-both

    # Append text to today's note through the running server
    daynote append \"meeting moved to 3pm\"

    # Append without a server
    daynote append --local \"meeting moved to 3pm\"
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Create today's note and clean up the previous one, then exit.
    RunOnce,

    /// Run once, then repeat every day at DAYNOTE_SCHEDULE_AT until stopped.
    Watch,

    /// Serve the append endpoint only.
    ServeApi,

    /// Run once, then run the daily scheduler and the append endpoint.
    ServeBoth,

    /// Append text to today's note.
    ///
    /// Reads the text from standard input when no argument is given.
    Append {
        /// Text to append.
        text: Option<String>,

        /// Write to the journal directly instead of going through the server.
        #[arg(short, long)]
        local: bool,

        /// Server URL (default: derived from DAYNOTE_BIND and DAYNOTE_PORT).
        #[arg(short, long, value_name = "URL", conflicts_with = "local")]
        server: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // Usage only; nothing is created or deleted.
        if let Err(err) = Cli::command().print_help() {
            eprintln!("Error: {err}");
            return ExitCode::from(1);
        }
        println!();
        return ExitCode::SUCCESS;
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("Run 'daynote --help' for the list of environment variables.");
            return ExitCode::from(1);
        }
    };

    init_logging(config.log_format);

    match run(command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "daynote failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(command: Command, config: Config) -> Result<()> {
    let journal = Journal::from_config(&config.journal);

    match command {
        Command::RunOnce => run_daily_now(&journal),
        Command::Watch => {
            run_daily_now(&journal)?;
            block_on(async {
                let scheduler = spawn_scheduler(&config, journal);
                wait_for_shutdown().await;
                scheduler.shutdown().await;
                Ok(())
            })
        }
        Command::ServeApi => block_on(serve_api(&config, journal)),
        Command::ServeBoth => {
            run_daily_now(&journal)?;
            block_on(async {
                let scheduler = spawn_scheduler(&config, journal.clone());
                let served = serve_api(&config, journal).await;
                scheduler.shutdown().await;
                served
            })
        }
        Command::Append {
            text,
            local,
            server,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            if local {
                append_local(&journal, &text)
            } else {
                let url = server.unwrap_or_else(|| config.base_url());
                block_on(append_remote(url, text))
            }
        }
    }
}

/// Builds a multi-threaded runtime for the async modes and drives `future` on it.
fn block_on<F>(future: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(future)
}

/// Runs the daily job for the current date.
fn run_daily_now(journal: &Journal) -> Result<()> {
    let today = SystemClock.today();
    let report = journal
        .run_daily(today)
        .with_context(|| format!("Daily job for {today} failed"))?;

    info!(
        date = %report.date,
        created = %report.created,
        cleanup = %report.cleanup,
        "Daily job finished"
    );
    Ok(())
}

fn spawn_scheduler(config: &Config, journal: Journal) -> SchedulerHandle {
    let schedule = DailySchedule::new(config.journal.schedule_at);
    Scheduler::new(journal, schedule, Arc::new(SystemClock))
        .spawn(config.journal.poll_interval)
}

async fn serve_api(config: &Config, journal: Journal) -> Result<()> {
    let address = config.socket_addr();
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    routes::serve(listener, AppState::new(journal), wait_for_shutdown())
        .await
        .context("Append endpoint failed")
}

fn append_local(journal: &Journal, text: &str) -> Result<()> {
    let outcome = journal
        .append(SystemClock.today(), text)
        .context("Failed to append to today's note")?;

    let verb = if outcome.is_skipped() {
        "Already present in"
    } else {
        "Appended to"
    };
    println!("{verb} {}", outcome.path().display());
    Ok(())
}

async fn append_remote(url: String, text: String) -> Result<()> {
    let client = AppendClient::new(url).context("Failed to create HTTP client")?;
    let response = client
        .append(&text)
        .await
        .with_context(|| format!("Failed to append through {}", client.base_url()))?;

    let verb = match response.status {
        AppendStatus::Success => "Appended to",
        AppendStatus::Skipped => "Already present in",
    };
    println!("{verb} {}", response.path.display());
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from standard input")?;
    Ok(text)
}

/// Initialize logging with tracing.
///
/// `RUST_LOG` overrides the default `info` filter; the format is either
/// human-readable or one JSON object per line.
fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init(),
    }
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// A handler that cannot be installed never fires; the other one still does.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
