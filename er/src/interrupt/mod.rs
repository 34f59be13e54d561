//! Interrupt handling
//!
//! Turns an operator's Ctrl+C into a checkpoint and a resume-or-stop decision.

mod choice;
mod controller;
mod operator;
mod signal;

pub use choice::{Choice, InvalidChoice};
pub use controller::{Exit, InterruptController, Phase, RunClock};
pub use operator::{ConsoleOperator, Operator, PauseSummary, ScriptedOperator};
pub use signal::spawn_interrupt_listener;
