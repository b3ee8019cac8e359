//! Entry point: parses flags, initializes logging, takes the first sample,
//! then runs either the interactive dashboard or the snapshot page.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pitop::app::App;
use pitop::config::Config;
use pitop::display::{Display, SnapshotDisplay, TerminalGuard, TuiDisplay};
use pitop::event::EventHandler;
use pitop::monitor::Monitor;
use pitop::provider::{MetricsProvider, SysinfoProvider, TimeoutProvider};
use pitop::scheduler::{RefreshScheduler, SystemClock};

const SNAPSHOT_INTERVAL_MS: u64 = 5_000;
const SNAPSHOT_LIMIT: usize = 5;

/// Terminal system monitor.
#[derive(Parser, Debug)]
#[command(name = "pitop", version, about)]
struct Cli {
    /// Show a read-only snapshot page instead of the interactive dashboard
    #[arg(long)]
    snapshot: bool,

    /// Settings file (TOML)
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of process rows to show
    #[arg(long, short = 'n', value_name = "K")]
    limit: Option<usize>,

    /// Metric refresh interval in milliseconds
    #[arg(
        long,
        short = 'i',
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(100..)
    )]
    interval_ms: Option<u64>,

    /// Write logs to this file (logging is discarded otherwise)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Minimum log level; RUST_LOG takes precedence
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.snapshot {
        let interval = cli.interval_ms.unwrap_or(SNAPSHOT_INTERVAL_MS);
        config.fast_interval_ms = interval;
        config.slow_interval_secs = (interval / 1_000).max(1);
        config.process_limit = cli.limit.unwrap_or(SNAPSHOT_LIMIT);
    } else {
        if let Some(interval) = cli.interval_ms {
            config.fast_interval_ms = interval;
        }
        if let Some(limit) = cli.limit {
            config.process_limit = limit;
        }
    }
    config.validate().context("invalid settings")?;
    let theme = config.palette.resolve()?;

    let provider = TimeoutProvider::new(SysinfoProvider::new, config.sample_timeout());
    let monitor =
        Monitor::start(provider, &config, Instant::now()).context("cannot read any host metrics")?;
    info!(snapshot = cli.snapshot, "starting display");

    if cli.snapshot {
        let _guard = TerminalGuard::enter(false)?;
        run(monitor, &config, SnapshotDisplay::new(io::stdout()))
    } else {
        let _guard = TerminalGuard::enter(true)?;
        run(monitor, &config, TuiDisplay::stdout(theme)?)
    }
}

fn run<P, D>(monitor: Monitor<P>, config: &Config, display: D) -> Result<()>
where
    P: MetricsProvider,
    D: Display,
{
    let scheduler = RefreshScheduler::new(config.fast_interval(), config.slow_interval());
    let mut app = App::new(monitor, scheduler, SystemClock, EventHandler::new(), display);
    app.run().context("display loop failed")?;
    Ok(())
}

fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    match file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The dashboard owns the terminal; without a file, logs go nowhere.
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init(),
    }
    Ok(())
}
