//! InterruptController - suspend, persist, prompt, resume or stop
//!
//! ```text
//!   Running --cancel--> Suspended --save--> Paused --resume--> Running
//!      |                                      |  ^
//!      |                                      |  +-- invalid input
//!      +--max cycle--> Stopped  <--terminate--+
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use super::{Choice, Operator, PauseSummary};
use crate::engine::{CancelSignal, CycleEngine, CycleState, Narrator, RunOutcome};
use crate::state::{RunState, StateStore};

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Suspended,
    Paused,
    Stopped,
}

/// How the controller finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The maximum cycle was reached and the save file removed
    Completed,
    /// The operator chose to stop; the last checkpoint is on disk
    Terminated,
}

/// Wall clock for the run, including time carried over from a save file
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started: Instant,
    carried: Duration,
}

impl RunClock {
    pub fn start(carried: Duration) -> Self {
        Self {
            started: Instant::now(),
            carried,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.carried + self.started.elapsed()
    }
}

/// Wraps the cycle engine and owns the checkpoint/resume protocol
pub struct InterruptController<N: Narrator, R: Rng, O: Operator> {
    engine: CycleEngine<N, R>,
    store: StateStore,
    operator: O,
    cancel: CancelSignal,
    max_cycle: u64,
    clock: RunClock,
    phase: Phase,
    last_checkpoint: Option<RunState>,
}

impl<N: Narrator, R: Rng, O: Operator> InterruptController<N, R, O> {
    pub fn new(
        engine: CycleEngine<N, R>,
        store: StateStore,
        operator: O,
        cancel: CancelSignal,
        max_cycle: u64,
        clock: RunClock,
    ) -> Self {
        debug!(max_cycle, "InterruptController::new: called");
        Self {
            engine,
            store,
            operator,
            cancel,
            max_cycle,
            clock,
            phase: Phase::Running,
            last_checkpoint: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recent checkpoint this controller wrote (or tried to write)
    pub fn last_checkpoint(&self) -> Option<&RunState> {
        self.last_checkpoint.as_ref()
    }

    pub fn engine(&self) -> &CycleEngine<N, R> {
        &self.engine
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// Drive the engine from `start_cycle` until completion or termination.
    ///
    /// Every resume re-enters the same [`CycleEngine::run`] at the captured
    /// cycle + 1; any number of interrupt rounds is supported.
    pub async fn drive(&mut self, start_cycle: u64, initial_score: f64) -> Exit {
        debug!(start_cycle, initial_score, "drive: called");
        let mut next_cycle = start_cycle;
        let mut score = initial_score;

        loop {
            self.phase = Phase::Running;
            let outcome = self
                .engine
                .run(next_cycle, score, self.max_cycle, &mut self.cancel)
                .await;

            match outcome {
                RunOutcome::Completed(state) => {
                    self.complete(state);
                    return Exit::Completed;
                }
                RunOutcome::Cancelled(state) => {
                    self.suspend(state);
                    match self.pause(state).await {
                        Choice::Resume => {
                            let drained = self.cancel.drain();
                            debug!(drained, "drive: resuming");
                            info!(cycle = state.cycle + 1, score = state.score, "Resuming");
                            self.operator.resuming();
                            next_cycle = state.cycle + 1;
                            score = state.score;
                        }
                        Choice::Terminate => {
                            self.operator.terminating();
                            self.checkpoint(state);
                            self.phase = Phase::Stopped;
                            info!(cycle = state.cycle, "Terminated by operator");
                            return Exit::Terminated;
                        }
                    }
                }
            }
        }
    }

    fn complete(&mut self, state: CycleState) {
        debug!(?state, "complete: called");
        // Failure is already reported by the store; a stale file only means the
        // next start resumes past the maximum and completes at once.
        let _ = self.store.delete();
        self.engine.narrator_mut().finale(state, self.clock.elapsed());
        self.phase = Phase::Stopped;
    }

    fn suspend(&mut self, state: CycleState) {
        debug!(?state, "suspend: called");
        self.phase = Phase::Suspended;
        self.checkpoint(state);
    }

    fn checkpoint(&mut self, state: CycleState) {
        if state.cycle == 0 {
            info!("No cycle completed yet, nothing to checkpoint");
            return;
        }

        let record = RunState::capture(state.cycle, state.score, self.clock.elapsed());
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "Continuing without a checkpoint");
        }
        self.last_checkpoint = Some(record);
    }

    async fn pause(&mut self, state: CycleState) -> Choice {
        self.phase = Phase::Paused;
        let summary = PauseSummary {
            cycle: state.cycle,
            score: state.score,
            elapsed: self.clock.elapsed(),
        };
        debug!(?summary, "pause: called");

        loop {
            let reply = match self.operator.ask(&summary).await {
                Ok(Some(reply)) => reply,
                Ok(None) => {
                    info!("Operator input closed, terminating");
                    return Choice::Terminate;
                }
                Err(e) => {
                    warn!(error = %e, "Operator prompt failed, terminating");
                    return Choice::Terminate;
                }
            };

            match reply.parse::<Choice>() {
                Ok(choice) => {
                    debug!(?choice, "pause: operator chose");
                    return choice;
                }
                Err(e) => {
                    debug!(%e, "pause: invalid choice, asking again");
                    self.operator.rejected(&e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CancelHandle, EngineSettings, cancel_channel};
    use crate::interrupt::ScriptedOperator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Cancels the first time each listed cycle starts and records every cycle
    struct Interrupter {
        handle: CancelHandle,
        at: Vec<u64>,
        narrated: Arc<Mutex<Vec<u64>>>,
    }

    impl Narrator for Interrupter {
        fn narrate_cycle(&mut self, cycle: u64, _score: f64) {
            self.narrated.lock().unwrap().push(cycle);
            if let Some(pos) = self.at.iter().position(|c| *c == cycle) {
                self.at.remove(pos);
                self.handle.cancel();
            }
        }

        fn progress(&mut self, _cycle: u64) {}
    }

    type Controller = InterruptController<Interrupter, StdRng, ScriptedOperator>;

    fn controller(temp: &TempDir, at: &[u64], replies: &[&str], max: u64) -> (Controller, Arc<Mutex<Vec<u64>>>) {
        let (handle, cancel) = cancel_channel();
        let narrated = Arc::new(Mutex::new(Vec::new()));
        let narrator = Interrupter {
            handle,
            at: at.to_vec(),
            narrated: narrated.clone(),
        };
        let engine = CycleEngine::new(narrator, StdRng::seed_from_u64(11), EngineSettings::default());
        let store = StateStore::new(temp.path().join("savegame.json"));
        let operator = ScriptedOperator::new(replies.iter().copied());
        let controller = InterruptController::new(
            engine,
            store,
            operator,
            cancel,
            max,
            RunClock::start(Duration::ZERO),
        );
        (controller, narrated)
    }

    #[tokio::test]
    async fn test_natural_completion_deletes_save() {
        let temp = TempDir::new().unwrap();
        let (mut controller, narrated) = controller(&temp, &[], &[], 3);
        let store = StateStore::new(temp.path().join("savegame.json"));
        store.save(&RunState::capture(0, 1.0, Duration::ZERO)).unwrap();

        assert_eq!(controller.drive(1, 144.65).await, Exit::Completed);
        assert_eq!(controller.phase(), Phase::Stopped);
        assert_eq!(*narrated.lock().unwrap(), vec![1, 2, 3]);
        assert!(!store.path().exists());
        assert!(controller.last_checkpoint().is_none());
    }

    #[tokio::test]
    async fn test_terminate_saves_last_completed_cycle() {
        let temp = TempDir::new().unwrap();
        let (mut controller, narrated) = controller(&temp, &[3], &["2"], 100);

        assert_eq!(controller.drive(1, 144.65).await, Exit::Terminated);
        assert_eq!(controller.phase(), Phase::Stopped);
        assert_eq!(*narrated.lock().unwrap(), vec![1, 2, 3]);

        let saved = StateStore::new(temp.path().join("savegame.json")).load().unwrap();
        assert_eq!(saved.cycle, 2);
        assert_eq!(Some(&saved.score), controller.last_checkpoint().map(|c| &c.score));
        assert_eq!(controller.operator().seen()[0].cycle, 2);
    }

    #[tokio::test]
    async fn test_resume_continues_at_next_cycle_with_captured_score() {
        let temp = TempDir::new().unwrap();
        let (mut controller, narrated) = controller(&temp, &[3], &["1"], 5);
        let mut observed = controller.engine().subscribe();

        assert_eq!(controller.drive(1, 144.65).await, Exit::Completed);
        // Cycle 3 was interrupted, discarded, and run again after resume
        assert_eq!(*narrated.lock().unwrap(), vec![1, 2, 3, 3, 4, 5]);
        assert_eq!(observed.borrow_and_update().cycle, 5);

        let paused_at = controller.operator().seen()[0];
        assert_eq!(paused_at.cycle, 2);
        let final_score = controller.engine().latest().score;
        assert!(final_score >= paused_at.score + 0.3 && final_score < paused_at.score + 4.5);
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts_without_state_change() {
        let temp = TempDir::new().unwrap();
        let (mut controller, _) = controller(&temp, &[2], &["x", "", "9", "2"], 100);

        assert_eq!(controller.drive(1, 10.0).await, Exit::Terminated);

        let seen = controller.operator().seen();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|s| s.cycle == 1 && s.score == seen[0].score));
        assert_eq!(controller.operator().rejected_count(), 3);
    }

    #[tokio::test]
    async fn test_repeated_interrupts_in_one_run() {
        let temp = TempDir::new().unwrap();
        let (mut controller, _) = controller(&temp, &[2, 5, 7], &["1", "resume", "2"], 100);

        assert_eq!(controller.drive(1, 10.0).await, Exit::Terminated);

        let seen = controller.operator().seen();
        let cycles: Vec<u64> = seen.iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, vec![1, 4, 6]);
        assert!(seen.windows(2).all(|w| w[0].score < w[1].score));
        assert!(seen.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));

        let saved = StateStore::new(temp.path().join("savegame.json")).load().unwrap();
        assert_eq!(saved.cycle, 6);
        assert!(saved.elapsed_seconds >= 0.0);
    }

    #[tokio::test]
    async fn test_closed_input_terminates() {
        let temp = TempDir::new().unwrap();
        let (mut controller, _) = controller(&temp, &[4], &[], 100);

        assert_eq!(controller.drive(1, 10.0).await, Exit::Terminated);
        let saved = StateStore::new(temp.path().join("savegame.json")).load().unwrap();
        assert_eq!(saved.cycle, 3);
    }

    #[tokio::test]
    async fn test_interrupt_before_any_cycle_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let (mut controller, _) = controller(&temp, &[1], &["2"], 100);

        assert_eq!(controller.drive(1, 10.0).await, Exit::Terminated);
        assert!(!temp.path().join("savegame.json").exists());
        assert!(controller.last_checkpoint().is_none());
    }

    #[test]
    fn test_clock_carries_previous_duration() {
        let clock = RunClock::start(Duration::from_secs(90));
        assert!(clock.elapsed() >= Duration::from_secs(90));
    }
}
