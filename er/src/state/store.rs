//! StateStore - load, save and delete the single run-state record

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::StateError;

/// Timestamp format written to the save file
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Checkpoint of the last fully completed cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Last cycle whose work and score increment were both applied
    pub cycle: u64,

    /// Accumulated score as of `cycle`
    #[serde(rename = "destruction_score")]
    pub score: f64,

    /// Local wall-clock time the record was written
    #[serde(rename = "timestamp", default)]
    pub checkpoint_timestamp: String,

    /// Cumulative run duration in seconds, rounded to 2 decimals
    #[serde(rename = "total_duration", default)]
    pub elapsed_seconds: f64,
}

impl RunState {
    /// Capture a checkpoint stamped with the current local time
    pub fn capture(cycle: u64, score: f64, elapsed: Duration) -> Self {
        debug!(cycle, score, ?elapsed, "RunState::capture: called");
        Self {
            cycle,
            score,
            checkpoint_timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            elapsed_seconds: round_centis(elapsed.as_secs_f64()),
        }
    }

    /// Cycle a resumed run starts at
    pub fn next_cycle(&self) -> u64 {
        self.cycle.saturating_add(1)
    }

    /// Duration carried forward when resuming from this record
    pub fn elapsed(&self) -> Duration {
        Duration::try_from_secs_f64(self.elapsed_seconds).unwrap_or_default()
    }
}

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// File-backed store for a single [`RunState`]
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    max_cycle: Option<u64>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(path = %path.display(), "StateStore::new: called");
        Self { path, max_cycle: None }
    }

    /// Treat records past `max_cycle` as unreadable
    pub fn with_max_cycle(mut self, max_cycle: u64) -> Self {
        self.max_cycle = Some(max_cycle);
        self
    }

    /// Path of the backing save file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the save file
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Create the save directory if needed and verify it is writable.
    ///
    /// This is the only store failure the caller is expected to treat as fatal.
    pub fn prepare(&self) -> Result<(), StateError> {
        let dir = self.dir();
        debug!(dir = %dir.display(), "prepare: called");

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| StateError::DirectoryUnwritable {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            info!(dir = %dir.display(), "Created save directory");
            println!("{}", format!("[system] Created save directory: {}", dir.display()).yellow());
        }

        if !dir.is_dir() {
            return Err(StateError::DirectoryUnwritable {
                path: dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        check_writable(dir).map_err(|reason| StateError::DirectoryUnwritable {
            path: dir.to_path_buf(),
            reason,
        })
    }

    /// Load the persisted state.
    ///
    /// Returns `None` when the file is missing. Unreadable or malformed files
    /// are reported and also yield `None`, so the run starts fresh.
    pub fn load(&self) -> Option<RunState> {
        debug!(path = %self.path.display(), "load: called");
        match self.read() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable save file");
                eprintln!("{}", format!("[warning] {}", e).yellow());
                None
            }
        }
    }

    fn read(&self) -> Result<Option<RunState>, StateError> {
        if !self.path.exists() {
            debug!("read: no save file");
            return Ok(None);
        }

        let unreadable = |reason: String| StateError::Unreadable {
            path: self.path.clone(),
            reason,
        };
        let content = fs::read_to_string(&self.path).map_err(|e| unreadable(e.to_string()))?;
        let state: RunState = serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;

        if let Some(max) = self.max_cycle
            && state.cycle > max
        {
            return Err(unreadable(format!("cycle {} exceeds the maximum of {}", state.cycle, max)));
        }

        debug!(cycle = state.cycle, score = state.score, "read: save file parsed");
        Ok(Some(state))
    }

    /// Persist the state, creating the directory if it went missing.
    ///
    /// Failures are reported and returned, never panicked on; the caller keeps
    /// running with its in-memory progress.
    pub fn save(&self, state: &RunState) -> Result<(), StateError> {
        debug!(cycle = state.cycle, score = state.score, "save: called");
        match self.write(state) {
            Ok(()) => {
                info!(path = %self.path.display(), cycle = state.cycle, "Checkpoint saved");
                println!(
                    "{}",
                    format!("[system] Progress saved to '{}'", self.path.display()).yellow()
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Checkpoint save failed");
                eprintln!("{}", format!("[error] {}", e).red());
                Err(e)
            }
        }
    }

    fn write(&self, state: &RunState) -> Result<(), StateError> {
        let failed = |reason: String| StateError::WriteFailed {
            path: self.path.clone(),
            reason,
        };

        let dir = self.dir();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| failed(e.to_string()))?;
        }

        let mut content = serde_json::to_string_pretty(state).map_err(|e| failed(e.to_string()))?;
        content.push('\n');
        fs::write(&self.path, content).map_err(|e| failed(e.to_string()))
    }

    /// Remove the save file if present
    pub fn delete(&self) -> Result<(), StateError> {
        debug!(path = %self.path.display(), "delete: called");
        if !self.path.exists() {
            debug!("delete: nothing to remove");
            return Ok(());
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Save file deleted");
                println!(
                    "{}",
                    format!("[system] Deleted save file: {}", self.path.display()).yellow()
                );
                Ok(())
            }
            Err(e) => {
                let err = StateError::DeleteFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                };
                error!(error = %err, "Save file delete failed");
                eprintln!("{}", format!("[error] {}", err).red());
                Err(err)
            }
        }
    }
}

#[cfg(unix)]
fn check_writable(dir: &Path) -> Result<(), String> {
    use nix::unistd::{AccessFlags, access};

    access(dir, AccessFlags::W_OK).map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn check_writable(dir: &Path) -> Result<(), String> {
    let meta = fs::metadata(dir).map_err(|e| e.to_string())?;
    if meta.permissions().readonly() {
        return Err("read-only directory".to_string());
    }
    Ok(())
}
