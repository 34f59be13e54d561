//! CycleEngine - drives cycles and accumulates the score

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{CancelSignal, Narrator};
use crate::config::Config;

/// Smallest score gain per cycle (inclusive)
pub const MIN_SCORE_STEP: f64 = 0.1;

/// Largest score gain per cycle (exclusive)
pub const MAX_SCORE_STEP: f64 = 1.5;

/// Nominal wall time of one cycle's narrative before pacing
pub const CYCLE_SECONDS: f64 = 0.9;

/// Generator for one random stream; `stream` separates score and narrative draws
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_os_rng(),
    }
}

/// The only state the engine exposes: the last fully completed cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    pub cycle: u64,
    pub score: f64,
}

/// How a call to [`CycleEngine::run`] ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// `max_cycle` was completed
    Completed(CycleState),
    /// Cancellation was requested; carries the last completed cycle
    Cancelled(CycleState),
}

/// Engine tuning derived from [`Config`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Cancellable wait standing in for a cycle's work
    pub cycle_delay: Duration,
    /// Emit a progress notice every N cycles
    pub progress_interval: u64,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cycle_delay: config.paced(CYCLE_SECONDS),
            progress_interval: config.progress_interval.max(1),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cycle_delay: Duration::ZERO,
            progress_interval: crate::DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Runs cycles from a starting point up to a maximum.
///
/// The engine never persists anything. Callers observe it through
/// [`CycleEngine::latest`] or a [`CycleEngine::subscribe`] receiver and decide
/// what to checkpoint.
pub struct CycleEngine<N: Narrator, R: Rng> {
    narrator: N,
    rng: R,
    settings: EngineSettings,
    latest: watch::Sender<CycleState>,
}

impl<N: Narrator, R: Rng> CycleEngine<N, R> {
    pub fn new(narrator: N, rng: R, settings: EngineSettings) -> Self {
        debug!(?settings, "CycleEngine::new: called");
        let (latest, _) = watch::channel(CycleState { cycle: 0, score: 0.0 });
        Self {
            narrator,
            rng,
            settings,
            latest,
        }
    }

    /// Last fully completed cycle
    pub fn latest(&self) -> CycleState {
        *self.latest.borrow()
    }

    /// Receiver updated after every completed cycle
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.latest.subscribe()
    }

    pub fn narrator_mut(&mut self) -> &mut N {
        &mut self.narrator
    }

    /// Run cycles `start_cycle..=max_cycle` starting from `initial_score`.
    ///
    /// Reentrant: the same call serves a fresh start and every resume. A
    /// cancellation that lands while a cycle is in progress discards that cycle.
    pub async fn run(
        &mut self,
        start_cycle: u64,
        initial_score: f64,
        max_cycle: u64,
        cancel: &mut CancelSignal,
    ) -> RunOutcome {
        let start_cycle = start_cycle.max(1);
        let interval = self.settings.progress_interval.max(1);
        debug!(start_cycle, initial_score, max_cycle, "run: called");

        let mut state = CycleState {
            cycle: start_cycle - 1,
            score: initial_score,
        };
        self.latest.send_replace(state);

        for cycle in start_cycle..=max_cycle {
            if cancel.is_requested() {
                info!(completed = state.cycle, "Cancellation requested before cycle {}", cycle);
                return RunOutcome::Cancelled(state);
            }

            self.narrator.narrate_cycle(cycle, state.score);

            if !self.work(cancel).await {
                info!(completed = state.cycle, "Cancellation during cycle {}, discarding it", cycle);
                return RunOutcome::Cancelled(state);
            }

            state = CycleState {
                cycle,
                score: state.score + self.rng.random_range(MIN_SCORE_STEP..MAX_SCORE_STEP),
            };
            self.latest.send_replace(state);

            if cycle % interval == 0 {
                debug!(cycle, "run: progress notice");
                self.narrator.progress(cycle);
            }
        }

        info!(cycle = state.cycle, score = state.score, "Reached maximum cycle");
        RunOutcome::Completed(state)
    }

    /// Wait out one cycle's work. Returns false if cancelled meanwhile.
    async fn work(&self, cancel: &mut CancelSignal) -> bool {
        if self.settings.cycle_delay.is_zero() {
            tokio::task::yield_now().await;
            return !cancel.is_requested();
        }

        tokio::select! {
            biased;
            _ = cancel.requested() => false,
            _ = tokio::time::sleep(self.settings.cycle_delay) => true,
        }
    }
}
