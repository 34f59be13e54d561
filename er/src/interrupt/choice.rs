//! Operator choices at the pause menu

use std::str::FromStr;
use thiserror::Error;

/// What the operator wants after an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Resume,
    Terminate,
}

/// Input that is neither resume nor terminate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid input '{0}', please enter 1 or 2")]
pub struct InvalidChoice(pub String);

impl FromStr for Choice {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "r" | "resume" | "continue" => Ok(Choice::Resume),
            "2" | "q" | "quit" | "exit" | "terminate" => Ok(Choice::Terminate),
            _ => Err(InvalidChoice(s.trim().to_string())),
        }
    }
}
