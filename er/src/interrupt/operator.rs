//! Operator - the person (or script) answering the pause menu

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::InvalidChoice;
use crate::engine::format_hms;

/// What the operator is shown while paused
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseSummary {
    /// Last fully completed cycle
    pub cycle: u64,
    /// Score as of `cycle`
    pub score: f64,
    /// Cumulative run time
    pub elapsed: Duration,
}

/// Request/response boundary for the pause menu
#[async_trait]
pub trait Operator: Send {
    /// Present the menu and wait for a reply. `None` means input is closed.
    async fn ask(&mut self, summary: &PauseSummary) -> Result<Option<String>>;

    /// The last reply was not a valid choice
    fn rejected(&mut self, _error: &InvalidChoice) {}

    /// The run is about to continue
    fn resuming(&mut self) {}

    /// The run is about to stop
    fn terminating(&mut self) {}
}

/// Interactive terminal operator using rustyline
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl ConsoleOperator {
    pub fn new() -> Self {
        Self
    }

    fn print_menu(summary: &PauseSummary) {
        println!("{}", "=".repeat(70));
        println!("{}", "Paused (Ctrl+C caught)".bright_red());
        println!("{}", format!("Current cycle: {}", summary.cycle).bright_red());
        println!("{}", format!("Destruction score: {:.2}", summary.score).bright_red());
        println!("{}", format!("Run time: {}", format_hms(summary.elapsed)).bright_red());
        println!();
        println!("Choose an action:");
        println!("  [1] Continue running");
        println!("  [2] Exit");
        println!("{}", "=".repeat(70));
    }
}

#[async_trait]
impl Operator for ConsoleOperator {
    async fn ask(&mut self, summary: &PauseSummary) -> Result<Option<String>> {
        debug!(?summary, "ConsoleOperator::ask: called");
        Self::print_menu(summary);

        tokio::task::spawn_blocking(read_reply)
            .await
            .context("Prompt task failed")?
    }

    fn rejected(&mut self, error: &InvalidChoice) {
        println!("{}", error.to_string().bright_red());
    }

    fn resuming(&mut self) {
        println!("{}", "Continuing the Eternal Recurrence protocol...".bright_yellow());
    }

    fn terminating(&mut self) {
        println!("{}", "Saving progress and exiting...".bright_red());
    }
}

fn read_reply() -> Result<Option<String>> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

    match rl.readline("Enter an option (1/2) > ") {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) => {
            // Ctrl+C at the prompt is just another invalid answer
            println!("^C");
            Ok(Some(String::new()))
        }
        Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    }
}

/// Operator that replays a fixed list of replies, then reports closed input
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    replies: VecDeque<String>,
    seen: Vec<PauseSummary>,
    rejected: usize,
}

impl ScriptedOperator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every summary the operator was asked about, in order
    pub fn seen(&self) -> &[PauseSummary] {
        &self.seen
    }

    /// Number of replies that were not valid choices
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn ask(&mut self, summary: &PauseSummary) -> Result<Option<String>> {
        self.seen.push(*summary);
        Ok(self.replies.pop_front())
    }

    fn rejected(&mut self, _error: &InvalidChoice) {
        self.rejected += 1;
    }
}
