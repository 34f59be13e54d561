//! Configuration types and loading
//!
//! Built once at startup (file, then CLI overrides) and handed to the store,
//! the engine and the controller. Nothing reads configuration from globals.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::cli::Cli;

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the save file
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Highest cycle the run will reach
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,

    /// Score a fresh run starts with
    #[serde(default = "default_initial_score")]
    pub initial_score: f64,

    /// Speed factor applied to every narrative delay (0 disables delays)
    #[serde(default = "default_pace")]
    pub pace: f64,

    /// Emit a progress notice every N cycles
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,

    /// Seed for the score and narrative generators
    #[serde(default)]
    pub seed: Option<u64>,

    /// Suppress per-cycle narrative output
    #[serde(default)]
    pub quiet: bool,
}

fn default_save_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::SAVE_FILE_NAME)
}

fn default_max_cycles() -> u64 {
    crate::DEFAULT_MAX_CYCLES
}

fn default_initial_score() -> f64 {
    crate::DEFAULT_INITIAL_SCORE
}

fn default_pace() -> f64 {
    1.0
}

fn default_progress_interval() -> u64 {
    crate::DEFAULT_PROGRESS_INTERVAL
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            max_cycles: default_max_cycles(),
            initial_score: default_initial_score(),
            pace: default_pace(),
            progress_interval: default_progress_interval(),
            log_level: None,
            seed: None,
            quiet: false,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .recurrence.yml
        let local_config = PathBuf::from(".recurrence.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/recurrence/config.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("recurrence").join("config.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        debug!(?cli, "apply_cli: called");
        if let Some(path) = &cli.save_path {
            self.save_path = path.clone();
        }
        if let Some(max_cycles) = cli.max_cycles {
            self.max_cycles = max_cycles;
        }
        if let Some(pace) = cli.pace {
            self.pace = pace;
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if cli.log_level.is_some() {
            self.log_level = cli.log_level.clone();
        }
        self.quiet |= cli.quiet;
        self
    }

    /// Check values and resolve the save path to an absolute path
    pub fn validate(mut self) -> Result<Self> {
        if self.max_cycles == 0 {
            return Err(eyre::eyre!("max_cycles must be at least 1"));
        }
        if !self.pace.is_finite() || self.pace < 0.0 {
            return Err(eyre::eyre!("pace must be a non-negative number, got {}", self.pace));
        }
        if self.progress_interval == 0 {
            return Err(eyre::eyre!("progress_interval must be at least 1"));
        }
        self.save_path = std::path::absolute(&self.save_path)
            .context(format!("Failed to resolve save path {}", self.save_path.display()))?;
        Ok(self)
    }

    /// Scale a nominal delay by the pace factor
    pub fn paced(&self, secs: f64) -> Duration {
        Duration::try_from_secs_f64(secs * self.pace).unwrap_or_default()
    }
}
