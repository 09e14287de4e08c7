//! Tickcross CLI: replay a recorded feed through the trading session.
//!
//! Commands:
//! - `run`: drive sessions from a CSV replay, paper-trading every admitted intent
//! - `check-config`: validate a TOML config and print it with defaults filled in

mod paper;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tickcross_core::feed::ReplayFeed;
use tickcross_core::report::spawn_reporter;
use tickcross_core::sink::{NullTradeLog, TradeLogSink};
use tickcross_core::trade_log::CsvTradeLog;
use tickcross_core::{BotConfig, RunSummary, SessionController};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::paper::PaperSink;

#[derive(Parser)]
#[command(
    name = "tickcross",
    about = "Tickcross: SMA crossover trading session driver"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV feed through the session controller.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV replay file (kind,timestamp,price,pnl,balance).
        #[arg(long)]
        replay: PathBuf,

        /// Override the configured log level.
        #[arg(long)]
        log_level: Option<String>,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        summary_json: bool,
    },
    /// Validate a config file and print the effective settings.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            replay,
            log_level,
            summary_json,
        } => cmd_run(config.as_deref(), &replay, log_level.as_deref(), summary_json),
        Commands::CheckConfig { config } => cmd_check_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    match path {
        Some(path) => BotConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(BotConfig::default()),
    }
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => bail!("unknown log level '{other}' (expected trace, debug, info, warn, error)"),
    }
}

fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")?;
    Ok(())
}

fn cmd_run(
    config_path: Option<&Path>,
    replay: &Path,
    log_level: Option<&str>,
    summary_json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(parse_level(log_level.unwrap_or(&config.log_level))?)?;

    info!(
        instrument = %config.instrument,
        short = config.sma.short_period,
        long = config.sma.long_period,
        "starting session driver"
    );
    if config.sma.is_degenerate() {
        warn!(
            period = config.sma.short_period,
            "short and long SMA periods are equal, no signal can ever fire"
        );
    }

    let trade_log: Box<dyn TradeLogSink> = if config.trade_log.enabled {
        let log = CsvTradeLog::open(&config.trade_log.path).with_context(|| {
            format!("opening trade log {}", config.trade_log.path.display())
        })?;
        info!(path = %log.path().display(), "trade log open");
        Box::new(log)
    } else {
        Box::new(NullTradeLog)
    };

    let mut feed = ReplayFeed::open(replay, &config.instrument)
        .with_context(|| format!("opening replay {}", replay.display()))?;

    let mut controller =
        SessionController::new(config.session_config(), PaperSink::default(), trade_log);
    let reporter = spawn_reporter(
        controller.live_stats(),
        Duration::from_secs(config.report.interval_secs),
    )
    .context("starting live reporter")?;

    let summary = controller.run(&mut feed);
    reporter.stop();

    info!(orders = controller.sink().submitted(), "paper orders sent");

    if summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Run ended: {:?}", summary.end);
    println!("Sessions started:  {}", summary.sessions_started);
    println!(
        "Ticks:             {} processed, {} ignored",
        summary.ticks_processed, summary.ticks_ignored
    );
    println!(
        "Signals:           {} ({} admitted, {} cooldown, {} stopped)",
        summary.signals, summary.admitted, summary.rejected_cooldown, summary.rejected_stopped
    );
    println!(
        "Orders:            {} submit failures",
        summary.submit_failures
    );
    println!(
        "Results:           {} ({} unmatched, {} dropped, {} not logged)",
        summary.results_recorded,
        summary.unmatched_results,
        summary.results_dropped,
        summary.trade_log_failures
    );
    println!("Feed errors:       {}", summary.feed_errors);
    println!("Final outcome:     {}", summary.final_outcome);
    println!(
        "Final session:     {} trades, P/L {:.2}, balance {:.2}",
        summary.final_trade_count, summary.final_pnl, summary.final_balance
    );
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    if config.sma.is_degenerate() {
        eprintln!("warning: short and long SMA periods are equal, no signal can ever fire");
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
