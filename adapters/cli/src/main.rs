#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Drop Catcher round without a display.

mod autopilot;

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use drop_catcher_controller::{RoundController, SIMULATION_STEP};
use drop_catcher_core::{
    Catcher, DifficultyPreset, DifficultyProfile, DropCategory, Event, HudSnapshot, PlayArea,
    RoundOutcome, RoundPhase,
};
use serde::Serialize;

use crate::autopilot::Autopilot;

/// Greeting printed before a text report.
const BANNER: &str = "Welcome to Drop Catcher.";

/// Command-line options for a headless round.
#[derive(Debug, Parser)]
#[command(
    name = "drop-catcher",
    about = "Plays one Drop Catcher round with a scripted catcher"
)]
struct Cli {
    /// Difficulty preset used when no profile file is given.
    #[arg(long, default_value_t = DifficultyPreset::Normal)]
    difficulty: DifficultyPreset,

    /// TOML file describing a custom difficulty profile.
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,

    /// Seed for drop categories and placement.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Simulated milliseconds between presentation frames.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1_000))]
    step_ms: u64,

    /// Top speed of the catcher in pixels per second.
    #[arg(long, default_value_t = 420.0)]
    catcher_speed: f32,

    /// Width of the play area in pixels.
    #[arg(long, default_value_t = 360.0)]
    width: f32,

    /// Height of the play area in pixels.
    #[arg(long, default_value_t = 640.0)]
    height: f32,

    /// Width of the catcher in pixels.
    #[arg(long, default_value_t = 120.0)]
    catcher_width: f32,

    /// Height of the catcher in pixels.
    #[arg(long, default_value_t = 90.0)]
    catcher_height: f32,

    /// Print the round report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct CatchTally {
    clean: u32,
    dirty: u32,
    obstacle: u32,
}

/// Summary printed once the round ends.
#[derive(Debug, Serialize)]
struct RoundReport {
    seed: u64,
    round: u32,
    outcome: Option<RoundOutcome>,
    elapsed_ms: u64,
    profile: DifficultyProfile,
    hud: HudSnapshot,
    caught: CatchTally,
    missed: u32,
    escalations: u32,
}

impl RoundReport {
    fn record(&mut self, events: &[Event]) {
        let mut landed = BTreeSet::new();
        let mut caught = BTreeSet::new();
        for event in events {
            match event {
                Event::DropLanded { drop, .. } => {
                    let _ = landed.insert(*drop);
                }
                Event::DropCaught { drop, category, .. } => {
                    let _ = caught.insert(*drop);
                    match category {
                        DropCategory::Clean => self.caught.clean += 1,
                        DropCategory::Dirty => self.caught.dirty += 1,
                        DropCategory::Obstacle => self.caught.obstacle += 1,
                    }
                }
                Event::DifficultyEscalated { .. } => self.escalations += 1,
                _ => {}
            }
        }
        let missed = landed.difference(&caught).count();
        self.missed += u32::try_from(missed).unwrap_or(u32::MAX);
    }

    fn print_text(&self) {
        let outcome = match self.outcome {
            Some(RoundOutcome::Survived) => "time is up",
            Some(RoundOutcome::PollutionMaxedOut) => "the water is fully polluted",
            None => "round interrupted",
        };
        println!(
            "Round {} over after {:.1}s: {outcome}.",
            self.round,
            self.elapsed_ms as f64 / 1_000.0
        );
        println!(
            "Caught {} clean, {} dirty and {} obstacles; {} drops missed.",
            self.caught.clean, self.caught.dirty, self.caught.obstacle, self.missed
        );
        println!(
            "Water quality {}% clean / {}% dirty, pollution {}%.",
            self.hud.clean_percent, self.hud.dirty_percent, self.hud.pollution
        );
        println!("{} People!", self.hud.score);
    }
}

/// Entry point for the Drop Catcher command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    ensure!(
        cli.catcher_speed.is_finite() && cli.catcher_speed > 0.0,
        "catcher speed must be a positive number, got {}",
        cli.catcher_speed
    );
    let area = PlayArea::new(cli.width, cli.height).context("invalid play area")?;
    let catcher = Catcher::new(cli.catcher_width, cli.catcher_height).context("invalid catcher")?;
    let profile = match &cli.profile {
        Some(path) => load_profile(path)?,
        None => cli.difficulty.profile(),
    };

    let report = play(&cli, profile, area, catcher)?;
    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        report.print_text();
    }
    Ok(())
}

fn load_profile(path: &Path) -> Result<DifficultyProfile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: DifficultyProfile = toml::from_str(&text)
        .with_context(|| format!("failed to parse profile {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("profile {} is not playable", path.display()))?;
    log::info!("loaded custom profile from {}", path.display());
    Ok(profile)
}

fn play(
    cli: &Cli,
    profile: DifficultyProfile,
    area: PlayArea,
    catcher: Catcher,
) -> Result<RoundReport> {
    let mut controller = RoundController::new(cli.seed);
    if !cli.json {
        println!("{BANNER}");
    }

    let mut events = Vec::new();
    controller.configure_play_area(area, &mut events);
    controller.select_difficulty(cli.difficulty, &mut events)?;
    let round = controller.start_round(profile, &mut events)?;

    let mut autopilot = Autopilot::new(area, catcher, cli.catcher_speed);
    let mut report = RoundReport {
        seed: cli.seed,
        round: round.get(),
        outcome: None,
        elapsed_ms: 0,
        profile,
        hud: controller.hud_snapshot(),
        caught: CatchTally::default(),
        missed: 0,
        escalations: 0,
    };
    autopilot.observe(Duration::ZERO, &events);
    events.clear();

    let step = Duration::from_millis(cli.step_ms);
    let mut elapsed = Duration::ZERO;
    while controller.phase() == RoundPhase::Running {
        // Spawns are timed per controller sub-step; the catcher only reacts per frame.
        let mut remaining = step;
        while !remaining.is_zero() && controller.phase() == RoundPhase::Running {
            let slice = remaining.min(SIMULATION_STEP);
            remaining -= slice;
            controller.advance(slice, &mut events);
            autopilot.observe(slice, &events);
            report.record(&events);
            events.clear();
        }
        elapsed += step - remaining;

        for (drop, bounds) in autopilot.steer(step) {
            controller.report_drop_landed(drop, bounds, &mut events);
        }
        report.record(&events);
        events.clear();
    }

    report.outcome = controller.outcome();
    report.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    report.hud = controller.hud_snapshot();
    log::info!(
        "round {} finished with {} catches",
        round.get(),
        report.caught.clean + report.caught.dirty + report.caught.obstacle
    );
    Ok(report)
}
