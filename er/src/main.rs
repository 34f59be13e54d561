//! Recurrence - eternal recurrence simulator
//!
//! CLI entry point: prepare the save directory, resume or start fresh, then hand
//! control to the interrupt controller.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use recurrence::cli::Cli;
use recurrence::config::Config;
use recurrence::engine::{ConsoleNarrator, CycleEngine, EngineSettings, cancel_channel, seeded_rng};
use recurrence::interrupt::{ConsoleOperator, Exit, InterruptController, RunClock, spawn_interrupt_listener};
use recurrence::state::StateStore;

/// Random stream for score increments
const SCORE_STREAM: u64 = 0;

/// Random stream for narrative text
const NARRATIVE_STREAM: u64 = 1;

fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recurrence")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("recurrence.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .apply_cli(&cli)
        .validate()?;
    info!(save_path = %config.save_path.display(), max_cycles = config.max_cycles, pace = config.pace, "Configuration loaded");

    let store = StateStore::new(&config.save_path).with_max_cycle(config.max_cycles);
    if let Err(e) = store.prepare() {
        eprintln!("{}", format!("[error] {}", e).bright_red());
        return Err(e).context("Save directory check failed");
    }

    let mut narrator = ConsoleNarrator::new(seeded_rng(config.seed, NARRATIVE_STREAM), config.pace, config.quiet);

    let (start_cycle, initial_score, carried) = match store.load() {
        Some(saved) => {
            info!(cycle = saved.cycle, score = saved.score, "Resuming from save file");
            narrator.announce_resume(&saved);
            (saved.next_cycle(), saved.score, saved.elapsed())
        }
        None => {
            info!("Starting a fresh run");
            narrator.announce_fresh();
            (1, config.initial_score, Duration::ZERO)
        }
    };

    let clock = RunClock::start(carried);
    if start_cycle == 1 && !config.quiet {
        debug!("main: running prologue");
        narrator.prologue().await;
    }

    // Installed only now: an interrupt during the prologue has nothing to save
    let (cancel_handle, cancel) = cancel_channel();
    let listener = spawn_interrupt_listener(cancel_handle).context("Failed to install interrupt handler")?;

    let engine = CycleEngine::new(
        narrator,
        seeded_rng(config.seed, SCORE_STREAM),
        EngineSettings::from_config(&config),
    );
    let mut controller =
        InterruptController::new(engine, store, ConsoleOperator::new(), cancel, config.max_cycles, clock);

    let exit = controller.drive(start_cycle, initial_score).await;
    listener.abort();

    if exit == Exit::Terminated {
        println!("{}", "The Amphoreus protocol was terminated safely.".bright_red());
    }

    info!(?exit, "Run finished");
    Ok(())
}
