//! Recurrence - resumable eternal-recurrence simulator
//!
//! Runs an effectively unbounded sequence of cycles, each adding a bounded
//! random amount to a score and narrating what happened. Ctrl+C never loses
//! completed work: the last finished cycle is written to a save file, the
//! operator chooses to continue or stop, and the next start picks up from
//! the save.
//!
//! # Modules
//!
//! - [`state`] - the persisted [`RunState`] and its [`StateStore`]
//! - [`engine`] - the [`CycleEngine`], cancellation channel and narrators
//! - [`interrupt`] - the [`InterruptController`] state machine and operators
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Save file
//!
//! ```text
//! {
//!   "cycle": 42,
//!   "destruction_score": 187.31,
//!   "timestamp": "2026-01-01 12:00:00",
//!   "total_duration": 37.8
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod interrupt;
pub mod state;

pub use config::Config;
pub use engine::{
    CancelHandle, CancelSignal, ConsoleNarrator, CycleEngine, CycleState, EngineSettings, Narrator, RunOutcome,
    SilentNarrator, cancel_channel, seeded_rng,
};
pub use interrupt::{
    Choice, ConsoleOperator, Exit, InterruptController, InvalidChoice, Operator, PauseSummary, Phase, RunClock,
    ScriptedOperator, spawn_interrupt_listener,
};
pub use state::{RunState, StateError, StateStore};

/// Default save file name, placed next to the executable
pub const SAVE_FILE_NAME: &str = "savegame.json";

/// Default maximum cycle (the eighth perfect number)
pub const DEFAULT_MAX_CYCLES: u64 = 33_550_336;

/// Score a fresh run starts with
pub const DEFAULT_INITIAL_SCORE: f64 = 144.65;

/// Cycles between progress notices
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;
