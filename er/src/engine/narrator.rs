//! Narrator - the presentation side of a cycle
//!
//! The engine only calls the [`Narrator`] trait, so score and cycle logic can be
//! tested without any of the text below.

use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::CycleState;
use super::names::{TITAN_FORMS, entity_name, inherit_name, titan_form};
use crate::state::RunState;

/// Name of the entity driving every cycle
const CHAMPION: &str = "Khaslana";

/// Identifier the champion carries through the narrative
const CHAMPION_ID: &str = "AionNeikos-3870";

/// Width of the separator rules
const RULE_WIDTH: usize = 70;

/// Prologue average-score records and the generations that set them
const PROLOGUE_RECORDS: [(u32, f64); 7] = [
    (1, 3.88),
    (2, 4.05),
    (4, 4.22),
    (6, 4.44),
    (10, 4.44),
    (12, 4.58),
    (14, 5.86),
];

const PROLOGUE_GENERATIONS: u32 = 14;

/// Receives the engine's per-cycle callbacks
pub trait Narrator: Send {
    /// Describe a cycle that is starting with the given score
    fn narrate_cycle(&mut self, cycle: u64, score: f64);

    /// Lightweight progress notice, emitted every `progress_interval` cycles
    fn progress(&mut self, cycle: u64);

    /// The run reached its maximum cycle
    fn finale(&mut self, _state: CycleState, _elapsed: Duration) {}
}

/// Narrator that says nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn narrate_cycle(&mut self, _cycle: u64, _score: f64) {}

    fn progress(&mut self, _cycle: u64) {}
}

/// Colored terminal narrator
pub struct ConsoleNarrator<R: Rng = StdRng> {
    rng: R,
    pace: f64,
    quiet: bool,
}

impl<R: Rng + Send> ConsoleNarrator<R> {
    pub fn new(rng: R, pace: f64, quiet: bool) -> Self {
        Self { rng, pace, quiet }
    }

    async fn pause(&self, secs: f64) {
        let delay = Duration::try_from_secs_f64(secs * self.pace).unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Startup notice when a save file was found
    pub fn announce_resume(&self, state: &RunState) {
        println!("{}", "Unfinished run detected...".bright_yellow());
        println!("Continuing from cycle {}", state.next_cycle());
        println!("Current destruction score: {:.2}", state.score);
        println!();
        println!(
            "{}",
            format!(
                "Skipping the startup phase, entering Eternal Recurrence at cycle {}...",
                state.next_cycle()
            )
            .bright_yellow()
        );
        println!();
    }

    /// Startup notice for a fresh run
    pub fn announce_fresh(&self) {
        println!("No save found, starting a new Eternal Recurrence protocol...");
        println!();
    }

    /// The inorganic cultivation phase shown before cycle 1 of a fresh run
    pub async fn prologue(&mut self) {
        println!("=== Amphoreus v10.3 (Dev) starting (simple mode) ===");
        self.pause(0.3).await;
        println!();
        println!("=== Entering inorganic entity cultivation ===");
        println!("...evolving the pure concepts of \"activity\" and \"stability\"...");
        self.pause(0.5).await;

        for pct in (0..=100).step_by(5) {
            print!("\r{}", progress_bar(pct as f64, "Simulation: "));
            let _ = io::stdout().flush();
            self.pause(0.05).await;
        }
        println!();

        println!("{}", ">>> Prototype validated! High-activity entity found (ID: 3455)! <<<".bright_red());
        self.pause(0.2).await;
        println!("{}", ">>> Data: activity=15.54, stability=11.78".bright_red());
        self.pause(0.2).await;
        println!("{}", ">>> Target average adjusted to 50.00 from the prototype <<<".bright_red());
        self.pause(0.3).await;
        println!();
        println!("{}", ">>> Formal simulation begins... <<<".bright_yellow());
        println!("Zeitgeist update: the dominant current is 'Destruction' (weight: 0.010)");
        self.pause(0.3).await;

        for generation in 1..=PROLOGUE_GENERATIONS {
            self.prologue_generation(generation);
            self.pause(0.2).await;
        }

        println!("{}", "=".repeat(RULE_WIDTH));
        println!("{}", "      WARNING: anomalous entity breaking the framework detected!      ".bright_red());
        println!("{}", "=".repeat(RULE_WIDTH));
        self.pause(0.3).await;
        println!("{}", "Entity analysis:".bright_red());
        println!("{}", format!("  - Designation: {} ({})", CHAMPION, CHAMPION_ID).bright_red());
        println!("{}", "  - Status: strongest individual, abnormal signal activity".bright_red());
        println!("{}", "  - Core affinity: Destruction, beyond the safety threshold".bright_red());
        self.pause(0.3).await;
        println!();
        println!(
            "{}",
            "Conclusion: the old evolution protocol has failed, loading the next phase...".bright_red()
        );
        println!();
        self.loading_animation("Loading...", 2).await;
        println!();
    }

    fn prologue_generation(&mut self, generation: u32) {
        let rng = &mut self.rng;
        let entity_count = rng.random_range(200..=400);
        let eliminations = if generation % 2 == 0 {
            rng.random_range(0..=200)
        } else {
            rng.random_range(0..=10)
        };

        println!(
            "--- Generation {}/{} | entities: {} | golden ones: 12 ---",
            generation,
            crate::DEFAULT_MAX_CYCLES,
            entity_count
        );

        if (2..=10).contains(&generation) {
            for _ in 0..rng.random_range(1..=5) {
                println!(
                    "Duel: {} meets {} on the path of 'Destruction' and defeats it!",
                    CHAMPION,
                    entity_name(rng)
                );
            }
        }

        println!("Generation {} finished.", generation);
        if eliminations > 0 {
            println!("Dynamically eliminated {} entities.", eliminations);
        } else if generation == PROLOGUE_GENERATIONS {
            println!("[Amphoreus event: Titan echo] the concept of 'Law' permeates every entity!");
        }

        if let Some((_, avg)) = PROLOGUE_RECORDS.iter().find(|(g, _)| *g == generation) {
            println!("{}", format!("New record! Average score reached {:.2}", avg).bright_red());
        }

        let rating = 6.0 + generation as f64 * 0.35 + rng.random_range(0.0..0.5);
        let purity = 0.18 + generation as f64 * 0.02;
        let holder = if generation >= 8 {
            format!("[{}] <{}>", CHAMPION_ID, CHAMPION)
        } else {
            format!("[{}] <follower of 'Destruction'>", entity_name(rng))
        };
        println!("Guidance network updates blueprint: dominant direction '{}'.", titan_form(rng));
        println!(
            "Current strongest: {}(rating:{:.2}|purity:{:.2}|path:Destruction:{:.2})",
            holder, rating, purity, purity
        );
        println!();
    }

    async fn loading_animation(&self, text: &str, rounds: usize) {
        for _ in 0..rounds {
            for spinner in ['/', '-', '\\', '|'] {
                print!("\r{}", format!("{} {}", text, spinner).bright_yellow());
                let _ = io::stdout().flush();
                self.pause(0.05).await;
            }
        }
        println!();
    }
}

impl<R: Rng + Send> Narrator for ConsoleNarrator<R> {
    fn narrate_cycle(&mut self, cycle: u64, score: f64) {
        if self.quiet {
            return;
        }
        let rng = &mut self.rng;

        println!("{}", format!("--- Eternal Recurrence cycle {} begins ---", cycle).bright_yellow());
        println!("{} sets out to seize the Coreflames.", CHAMPION);

        let titans: Vec<String> = TITAN_FORMS.iter().map(|_| entity_name(rng)).collect();
        for (titan, form) in titans.iter().zip(TITAN_FORMS) {
            println!("Entity {} has become the [{}] Titan.", titan, form);
        }

        for titan in &titans {
            let action = ["negotiate", "slay"].choose(rng).copied().unwrap_or("slay");
            println!("Decision: {} initiates [{}] against {}...", CHAMPION, action, titan);
            if action == "negotiate" {
                println!("...negotiation succeeded! {} takes every Coreflame!", CHAMPION_ID);
            } else {
                println!("...{} takes every Coreflame!", CHAMPION_ID);
            }
        }

        println!("Guidance network updates blueprint: dominant direction '{}'.", titan_form(rng));
        let memory = score * 0.14;
        let purity = score * 0.006;
        println!(
            "Current strongest: [PallasAstraeus-2812] <follower of 'Remembrance'>(rating:{:.2}|purity:{:.2}|path:Remembrance:{:.2})",
            memory, purity, purity
        );
        println!("(Phase three: Eternal Recurrence)");

        for _ in 0..rng.random_range(5..=20) {
            println!("Decision: {} executes [slay] on {}!", CHAMPION, entity_name(rng));
        }

        println!("{}", "=".repeat(RULE_WIDTH));
        println!(
            "{}",
            format!("{} gathered all 12 Coreflames! Cycle {} ends!", CHAMPION, cycle).bright_red()
        );
        println!("{}", format!("Destruction score this cycle: {:.2}", score).bright_red());
        println!("{}", "=".repeat(RULE_WIDTH));

        let chosen = titans.choose(rng).cloned().unwrap_or_else(|| CHAMPION_ID.to_string());
        let heir = inherit_name(rng, &chosen);
        println!("A new cycle is about to begin... {}'s will becomes its blueprint...", CHAMPION);
        println!("Among the golden ones, {} is this cycle's Phainon; data inheritance begins...", chosen);
        println!("{}", format!("Inheritance complete! The new {} is {}.", CHAMPION, heir).bright_yellow());
        println!("The old entities fade; new life is born from {}'s will...", CHAMPION);
    }

    fn progress(&mut self, cycle: u64) {
        eprintln!("[system] Completed {} cycles of Eternal Recurrence...", cycle);
    }

    fn finale(&mut self, state: CycleState, elapsed: Duration) {
        println!(
            "{}",
            format!(
                "=== Eternal Recurrence reached its maximum of {} cycles. Protocol complete. ===",
                state.cycle
            )
            .bright_red()
        );
        println!("{}", format!("Total time: {}", format_hms(elapsed)).bright_yellow());
    }
}

/// Render a fixed-width progress bar for the prologue
pub fn progress_bar(percentage: f64, prefix: &str) -> String {
    const BAR_LENGTH: usize = 50;
    let filled = ((BAR_LENGTH as f64 * percentage / 100.0) as usize).min(BAR_LENGTH);
    let stage = if percentage <= 100.0 {
        "(phase one: inorganic simulation)"
    } else {
        "(phase two: tracking entities)"
    };
    format!(
        "{}|{}{}| {:.1}% {}",
        prefix,
        "█".repeat(filled),
        "-".repeat(BAR_LENGTH - filled),
        percentage,
        stage
    )
}

/// Format a duration as `HH:MM:SS.ss`
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64();
    let hours = (total / 3600.0) as u64;
    let minutes = ((total % 3600.0) / 60.0) as u64;
    let seconds = total % 60.0;
    format!("{:02}:{:02}:{:05.2}", hours, minutes, seconds)
}
