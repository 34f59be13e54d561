//! State store errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors from state store operations
#[derive(Debug, Error)]
pub enum StateError {
    /// The save file exists but could not be read or parsed
    #[error("Cannot read save file '{path}': {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Writing the save file failed; in-memory progress is unaffected
    #[error("Cannot write save file '{path}': {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Removing the save file after completion failed
    #[error("Cannot delete save file '{path}': {reason}")]
    DeleteFailed { path: PathBuf, reason: String },

    /// The save directory is missing and cannot be created, or is read-only
    #[error("Save directory '{path}' is not writable: {reason}")]
    DirectoryUnwritable { path: PathBuf, reason: String },
}
