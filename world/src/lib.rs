#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Drop Catcher.

use std::{collections::BTreeMap, time::Duration};

use drop_catcher_core::{
    CatchEffect, Command, DifficultyPreset, DifficultyProfile, DropDescriptor, DropId, Event,
    PlayArea, RoundId, RoundOutcome, RoundPhase, StartRejection, ACCUMULATOR_LIMIT,
    SPAWN_INTERVAL_STEP,
};

/// Mutable values describing the round in progress.
///
/// Every field is reset from the active [`DifficultyProfile`] when a round
/// starts or when the game returns to the menu.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    remaining_seconds: u32,
    score: u32,
    pollution: u32,
    clean: u32,
    dirty: u32,
    speed_multiplier: f64,
    spawn_interval: Duration,
    phase: RoundPhase,
    outcome: Option<RoundOutcome>,
}

impl RoundState {
    fn fresh(profile: &DifficultyProfile, phase: RoundPhase) -> Self {
        Self {
            remaining_seconds: profile.duration_secs,
            score: 0,
            pollution: 0,
            clean: 0,
            dirty: 0,
            speed_multiplier: 1.0,
            spawn_interval: profile.base_spawn_interval(),
            phase,
            outcome: None,
        }
    }

    /// Whole seconds left on the round clock.
    #[must_use]
    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Current score, never negative.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Loss-condition accumulator, `0..=100`.
    #[must_use]
    pub const fn pollution(&self) -> u32 {
        self.pollution
    }

    /// Clean quality accumulator, `0..=100`.
    #[must_use]
    pub const fn clean(&self) -> u32 {
        self.clean
    }

    /// Dirty quality accumulator, `0..=100`.
    #[must_use]
    pub const fn dirty(&self) -> u32 {
        self.dirty
    }

    /// Divisor applied to base fall durations.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Current gap between spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Current phase of the round state machine.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// How the last round ended; `None` unless the phase is [`RoundPhase::Ended`].
    #[must_use]
    pub const fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }
}

/// Represents the authoritative Drop Catcher world state.
#[derive(Debug)]
pub struct World {
    play_area: PlayArea,
    preset: DifficultyPreset,
    profile: DifficultyProfile,
    round: RoundId,
    state: RoundState,
    drops: BTreeMap<DropId, DropDescriptor>,
    next_drop: u32,
}

impl World {
    /// Creates a new world sitting on the start menu with the default preset.
    #[must_use]
    pub fn new() -> Self {
        let preset = DifficultyPreset::default();
        let profile = preset.profile();
        Self {
            play_area: PlayArea::DEFAULT,
            preset,
            profile,
            round: RoundId::default(),
            state: RoundState::fresh(&profile, RoundPhase::Menu),
            drops: BTreeMap::new(),
            next_drop: 1,
        }
    }

    fn reset(&mut self, phase: RoundPhase) {
        self.drops.clear();
        self.state = RoundState::fresh(&self.profile, phase);
    }

    fn accepts(&self, round: RoundId) -> bool {
        self.state.phase == RoundPhase::Running && round == self.round
    }

    fn allocate_drop_id(&mut self) -> DropId {
        let id = DropId::new(self.next_drop);
        self.next_drop = self.next_drop.wrapping_add(1);
        id
    }

    fn end_round(&mut self, outcome: RoundOutcome, out_events: &mut Vec<Event>) {
        self.state.phase = RoundPhase::Ended;
        self.state.outcome = Some(outcome);
        log::info!(
            "round {} ended: {:?} with score {} ({} drops left frozen)",
            self.round.get(),
            outcome,
            self.state.score,
            self.drops.len()
        );
        out_events.push(Event::RoundEnded {
            round: self.round,
            score: self.state.score,
            outcome,
        });
    }

    fn apply_catch(&mut self, effect: CatchEffect, out_events: &mut Vec<Event>) {
        let state = &mut self.state;
        state.score = state.score.saturating_add_signed(effect.score_delta);
        state.clean = (state.clean + effect.clean_gain).min(ACCUMULATOR_LIMIT);
        state.dirty = (state.dirty + effect.dirty_gain).min(ACCUMULATOR_LIMIT);
        out_events.push(Event::ScoreChanged { score: state.score });

        if effect.pollution_gain > 0 {
            state.pollution = (state.pollution + effect.pollution_gain).min(ACCUMULATOR_LIMIT);
            out_events.push(Event::PollutionChanged {
                pollution: state.pollution,
            });
        }

        if effect.escalates {
            state.speed_multiplier =
                round_to_hundredths(state.speed_multiplier + self.profile.speed_step);
            state.spawn_interval = state
                .spawn_interval
                .saturating_sub(SPAWN_INTERVAL_STEP)
                .max(self.profile.min_spawn_interval());
            log::debug!(
                "round {} escalated: speed x{:.2}, spawn every {:?}",
                self.round.get(),
                state.speed_multiplier,
                state.spawn_interval
            );
            out_events.push(Event::DifficultyEscalated {
                round: self.round,
                speed_multiplier: state.speed_multiplier,
                spawn_interval: state.spawn_interval,
            });
        }

        for &kind in effect.feedback {
            out_events.push(Event::Feedback { kind });
        }

        if self.state.pollution >= ACCUMULATOR_LIMIT {
            self.end_round(RoundOutcome::PollutionMaxedOut, out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectDifficulty { preset } => {
            if world.state.phase == RoundPhase::Running {
                log::debug!("ignoring difficulty selection while a round is running");
                return;
            }
            world.preset = preset;
            if world.state.phase == RoundPhase::Menu {
                world.profile = preset.profile();
                world.reset(RoundPhase::Menu);
            }
            out_events.push(Event::DifficultySelected { preset });
        }
        Command::ConfigurePlayArea { area } => {
            world.play_area = area;
            out_events.push(Event::PlayAreaConfigured { area });
        }
        Command::StartRound { profile } => {
            if world.state.phase == RoundPhase::Running {
                out_events.push(Event::RoundStartRejected {
                    reason: StartRejection::InvalidPhase {
                        phase: world.state.phase,
                    },
                });
                return;
            }
            if let Err(error) = profile.validate() {
                log::warn!("rejecting round start: {error}");
                out_events.push(Event::RoundStartRejected {
                    reason: StartRejection::InvalidProfile(error),
                });
                return;
            }

            world.profile = profile;
            world.round = world.round.next();
            world.reset(RoundPhase::Running);
            log::info!(
                "round {} started: {}s, spawning every {:?}",
                world.round.get(),
                profile.duration_secs,
                world.state.spawn_interval
            );
            out_events.push(Event::RoundStarted {
                round: world.round,
                profile,
                spawn_interval: world.state.spawn_interval,
            });
        }
        Command::ReturnToMenu => {
            if world.state.phase != RoundPhase::Ended {
                log::debug!("ignoring return to menu from {:?}", world.state.phase);
                return;
            }
            world.profile = world.preset.profile();
            world.reset(RoundPhase::Menu);
            out_events.push(Event::ReturnedToMenu);
        }
        Command::Tick { dt } => {
            if world.state.phase == RoundPhase::Running {
                out_events.push(Event::TimeAdvanced { dt });
            }
        }
        Command::ClockTick { round } => {
            if !world.accepts(round) {
                log::debug!("dropping stale clock tick for round {}", round.get());
                return;
            }
            world.state.remaining_seconds = world.state.remaining_seconds.saturating_sub(1);
            out_events.push(Event::ClockTicked {
                round,
                remaining_seconds: world.state.remaining_seconds,
            });
            if world.state.remaining_seconds == 0 {
                world.end_round(RoundOutcome::Survived, out_events);
            }
        }
        Command::RequestSpawn { round } => {
            if !world.accepts(round) {
                log::debug!("dropping stale spawn request for round {}", round.get());
                return;
            }
            out_events.push(Event::SpawnRequested { round });
        }
        Command::SpawnDrop { round, spec } => {
            if !world.accepts(round) {
                log::debug!("discarding drop classified for round {}", round.get());
                return;
            }
            let id = world.allocate_drop_id();
            let drop = DropDescriptor::from_spec(id, spec);
            log::trace!("spawned drop {} as {:?}", id.get(), drop.category);
            let _ = world.drops.insert(id, drop);
            out_events.push(Event::DropSpawned { round, drop });
        }
        Command::ReportDropLanded { drop, catcher } => {
            if world.state.phase != RoundPhase::Running {
                log::debug!("drop {} landed after the round stopped", drop.get());
                return;
            }
            let Some(descriptor) = world.drops.remove(&drop) else {
                log::debug!("ignoring landing report for unknown drop {}", drop.get());
                return;
            };
            out_events.push(Event::DropLanded {
                round: world.round,
                drop,
                category: descriptor.category,
                bounds: descriptor.landing_bounds(world.play_area),
                catcher,
            });
        }
        Command::ApplyCatch {
            round,
            drop,
            category,
            effect,
        } => {
            if !world.accepts(round) {
                log::debug!("ignoring catch of drop {} for round {}", drop.get(), round.get());
                return;
            }
            out_events.push(Event::DropCaught {
                round,
                drop,
                category,
            });
            world.apply_catch(effect, out_events);
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use drop_catcher_core::{
        quality_percentages, DifficultyPreset, DifficultyProfile, DropDescriptor, DropId,
        HudSnapshot, PlayArea, RoundId, RoundOutcome, RoundPhase, SpawnContext,
    };

    use super::{RoundState, World};

    /// Play area used for drop placement and landing bounds.
    #[must_use]
    pub fn play_area(world: &World) -> PlayArea {
        world.play_area
    }

    /// Current phase of the round state machine.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.state.phase
    }

    /// Outcome of the last finished round, if the world sits on the result screen.
    #[must_use]
    pub fn outcome(world: &World) -> Option<RoundOutcome> {
        world.state.outcome
    }

    /// Identifier of the most recently started round.
    #[must_use]
    pub fn round(world: &World) -> RoundId {
        world.round
    }

    /// Full view of the mutable round values.
    #[must_use]
    pub fn round_state(world: &World) -> &RoundState {
        &world.state
    }

    /// Profile governing the current or next round.
    #[must_use]
    pub fn profile(world: &World) -> &DifficultyProfile {
        &world.profile
    }

    /// Preset most recently selected on the menu.
    #[must_use]
    pub fn selected_preset(world: &World) -> DifficultyPreset {
        world.preset
    }

    /// Drops that spawned and have not landed yet, ordered by identifier.
    pub fn in_flight_drops(world: &World) -> impl Iterator<Item = &DropDescriptor> {
        world.drops.values()
    }

    /// Looks up a single unresolved drop.
    #[must_use]
    pub fn in_flight_drop(world: &World, drop: DropId) -> Option<&DropDescriptor> {
        world.drops.get(&drop)
    }

    /// Values rendered by the heads-up display. Pure read.
    #[must_use]
    pub fn hud_snapshot(world: &World) -> HudSnapshot {
        let state = &world.state;
        let duration = world.profile.duration_secs;
        let remaining_fraction = if duration == 0 {
            0.0
        } else {
            state.remaining_seconds as f32 / duration as f32
        };
        let (clean_percent, dirty_percent) = quality_percentages(state.clean, state.dirty);
        HudSnapshot {
            remaining_fraction,
            clean_percent,
            dirty_percent,
            score: state.score,
            pollution: state.pollution,
        }
    }

    /// Inputs the classifier needs to describe the next drop.
    #[must_use]
    pub fn spawn_context(world: &World) -> SpawnContext {
        SpawnContext {
            round: world.round,
            obstacle_probability: world.profile.obstacle_probability,
            clean_probability: world.profile.clean_probability,
            speed_multiplier: world.state.speed_multiplier,
            play_area: world.play_area,
        }
    }
}
