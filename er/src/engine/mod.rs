//! Cycle engine
//!
//! Owns the cycle counter and score. Narrative output goes through the
//! [`Narrator`] trait and cancellation arrives through a [`CancelSignal`].

mod cancel;
mod cycle;
pub mod names;
mod narrator;

pub use cancel::{CancelHandle, CancelSignal, cancel_channel};
pub use cycle::{
    CYCLE_SECONDS, CycleEngine, CycleState, EngineSettings, MAX_SCORE_STEP, MIN_SCORE_STEP, RunOutcome, seeded_rng,
};
pub use narrator::{ConsoleNarrator, Narrator, SilentNarrator, format_hms, progress_bar};
