//! Checkpoint and resume across simulated process restarts
//!
//! Each "process" builds a fresh engine and controller over the same save file,
//! the way `main` does.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use recurrence::{
    CancelHandle, CycleEngine, EngineSettings, Exit, InterruptController, Narrator, RunClock, ScriptedOperator,
    StateStore, cancel_channel,
};
use tempfile::TempDir;

/// Cancels once when `at` starts; records narrated cycles and the score each began with
struct Harness {
    handle: CancelHandle,
    at: Option<u64>,
    narrated: Arc<Mutex<Vec<(u64, f64)>>>,
}

impl Narrator for Harness {
    fn narrate_cycle(&mut self, cycle: u64, score: f64) {
        self.narrated.lock().unwrap().push((cycle, score));
        if self.at == Some(cycle) {
            self.at = None;
            self.handle.cancel();
        }
    }

    fn progress(&mut self, _cycle: u64) {}
}

/// One simulated process lifetime; returns how it ended and what it narrated
async fn run_process(
    store: &StateStore,
    interrupt_at: Option<u64>,
    replies: &[&str],
    max: u64,
    seed: u64,
) -> (Exit, Vec<(u64, f64)>) {
    let (start_cycle, initial_score, carried) = match store.load() {
        Some(saved) => (saved.next_cycle(), saved.score, saved.elapsed()),
        None => (1, recurrence::DEFAULT_INITIAL_SCORE, Duration::ZERO),
    };

    let (handle, cancel) = cancel_channel();
    let narrated = Arc::new(Mutex::new(Vec::new()));
    let harness = Harness {
        handle,
        at: interrupt_at,
        narrated: narrated.clone(),
    };
    let engine = CycleEngine::new(harness, StdRng::seed_from_u64(seed), EngineSettings::default());
    let mut controller = InterruptController::new(
        engine,
        store.clone(),
        ScriptedOperator::new(replies.iter().copied()),
        cancel,
        max,
        RunClock::start(carried),
    );

    let exit = controller.drive(start_cycle, initial_score).await;
    let narrated = narrated.lock().unwrap().clone();
    (exit, narrated)
}

#[tokio::test]
async fn test_fresh_run_to_max_leaves_no_save() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().join("savegame.json"));

    let (exit, narrated) = run_process(&store, None, &[], 3, 1).await;

    assert_eq!(exit, Exit::Completed);
    let cycles: Vec<u64> = narrated.iter().map(|(c, _)| *c).collect();
    assert_eq!(cycles, vec![1, 2, 3]);
    assert_eq!(narrated[0].1, 144.65);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_existing_save_resumes_at_next_cycle() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().join("savegame.json"));
    fs::write(store.path(), r#"{"cycle": 5, "destruction_score": 10.0}"#).unwrap();

    let (exit, narrated) = run_process(&store, None, &[], 7, 2).await;

    assert_eq!(exit, Exit::Completed);
    assert_eq!(narrated[0], (6, 10.0));
    assert_eq!(narrated.len(), 2);
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_terminate_then_restart_picks_up_checkpoint() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().join("savegame.json"));

    let (exit, first) = run_process(&store, Some(3), &["2"], 100, 3).await;
    assert_eq!(exit, Exit::Terminated);
    assert_eq!(first.len(), 3);

    let saved = store.load().expect("checkpoint should exist");
    assert_eq!(saved.cycle, 2);
    assert!(saved.elapsed_seconds >= 0.0);

    let (exit, second) = run_process(&store, None, &[], 4, 4).await;
    assert_eq!(exit, Exit::Completed);
    assert_eq!(second[0], (3, saved.score));
    assert_eq!(second.last().map(|(c, _)| *c), Some(4));
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_elapsed_time_accumulates_across_restarts() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().join("savegame.json"));
    fs::write(
        store.path(),
        r#"{"cycle": 1, "destruction_score": 1.0, "timestamp": "2026-01-01 00:00:00", "total_duration": 120.5}"#,
    )
    .unwrap();

    run_process(&store, Some(4), &["2"], 100, 5).await;

    let saved = store.load().unwrap();
    assert_eq!(saved.cycle, 3);
    assert!(saved.elapsed_seconds >= 120.5);
}

#[tokio::test]
async fn test_corrupt_save_starts_fresh() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::new(temp.path().join("savegame.json"));
    fs::write(store.path(), "{\"cycle\": 5, \"destruction_score\": ").unwrap();

    let (exit, narrated) = run_process(&store, None, &[], 2, 6).await;

    assert_eq!(exit, Exit::Completed);
    assert_eq!(narrated[0], (1, 144.65));
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_unwritable_save_keeps_run_going() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let store = StateStore::new(blocker.join("savegame.json"));

    // Save fails at the interrupt; the operator can still resume and finish
    let (exit, narrated) = run_process(&store, Some(2), &["1"], 4, 7).await;

    assert_eq!(exit, Exit::Completed);
    let cycles: Vec<u64> = narrated.iter().map(|(c, _)| *c).collect();
    assert_eq!(cycles, vec![1, 2, 2, 3, 4]);
}
