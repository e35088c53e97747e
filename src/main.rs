//! procmain demo host.
//!
//! Runs a heartbeat worker under the lifecycle driver. Stop it with Ctrl-C or
//! SIGTERM; send SIGABRT to get a diagnostic dump before it exits.
//!
//! ```text
//!   main ─▶ load config ─▶ init logging ─▶ run_main ─▶ LifecycleDriver
//!                                                        │
//!                                  ┌─────────────────────┴───────────┐
//!                                  │ interactive           detached  │
//!                                  │ signals → handler     callback  │
//!                                  │ callback                        │
//!                                  └─────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use procmain::config::{load_config, Config, LogFormat, RunMode};
use procmain::observability::init_logging;
use procmain::{LifecycleDriver, Shutdown};

#[derive(Parser)]
#[command(name = "procmain")]
#[command(about = "Run a long-lived worker with portable signal handling", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without subscribing to terminal signals.
    #[arg(long)]
    detached: bool,

    /// Log filter directive, overrides the config file.
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format, overrides the config file.
    #[arg(long, value_parser = parse_format)]
    log_format: Option<LogFormat>,

    /// Seconds between heartbeats.
    #[arg(long, default_value_t = 5)]
    heartbeat_secs: u64,

    /// Stop on our own after this many seconds.
    #[arg(long)]
    run_for_secs: Option<u64>,
}

fn parse_format(s: &str) -> Result<LogFormat, String> {
    match s {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("procmain: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if cli.detached {
        config.run.mode = RunMode::Detached;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("procmain: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        exe = %procmain::exe_path().display(),
        mode = ?config.run.mode,
        "procmain v0.1.0 starting"
    );

    let heartbeat = Duration::from_secs(cli.heartbeat_secs.max(1));
    let run_for = cli.run_for_secs.map(Duration::from_secs);

    let driver = LifecycleDriver::new(config);
    let shutdown = driver.shutdown().clone();

    procmain::run_main_with(driver, move || worker(heartbeat, run_for, shutdown))
}

async fn worker(
    heartbeat: Duration,
    run_for: Option<Duration>,
    shutdown: Shutdown,
) -> Result<(), std::io::Error> {
    let deadline = run_for.map(|d| tokio::time::Instant::now() + d);
    let mut ticker = tokio::time::interval(heartbeat);
    let beats = Arc::new(AtomicU64::new(0));

    // Reports the final count once a signal stops the run.
    let mut notice = shutdown.subscribe();
    let reported = beats.clone();
    tokio::spawn(async move {
        if let Ok(signal) = notice.recv().await {
            tracing::info!(
                signal = %signal,
                beats = reported.load(Ordering::Relaxed),
                "Stopping heartbeat"
            );
        }
    });

    loop {
        ticker.tick().await;
        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
            tracing::info!(beats = beats.load(Ordering::Relaxed), "Run time elapsed");
            return Ok(());
        }
        let count = beats.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(beats = count, "Heartbeat");
    }
}
