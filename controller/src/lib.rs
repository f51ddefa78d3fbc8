#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round controller that sequences the world and its systems for a presentation layer.
//!
//! The controller owns the authoritative [`World`] together with every pure
//! system. Each public operation turns into one [`Command`]; the controller
//! applies it, dispatches the resulting events to the systems, and keeps
//! applying the commands they answer with until the queue drains. A handler
//! therefore always runs to completion before the next command is considered.

use std::{collections::VecDeque, time::Duration};

use drop_catcher_core::{
    Command, DifficultyPreset, DifficultyProfile, DropDescriptor, DropId, Event, HudSnapshot,
    PlayArea, Rect, RoundId, RoundOutcome, RoundPhase, StartRejection,
};
use drop_catcher_system_classifier::DropClassifier;
use drop_catcher_system_clock::RoundClock;
use drop_catcher_system_collision::CollisionResolver;
use drop_catcher_system_spawning::SpawnScheduler;
use drop_catcher_world::{self as world, query, World};
use thiserror::Error;

/// Largest slice of simulated time handed to the systems in one pump.
pub const SIMULATION_STEP: Duration = Duration::from_millis(10);

/// Errors returned by controller operations that the state machine refuses.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RoundError {
    /// The world declined to start the round.
    #[error(transparent)]
    StartRejected(#[from] StartRejection),
    /// The requested transition does not exist from the current phase.
    #[error("cannot {action} while the game is {phase:?}")]
    InvalidTransition {
        /// Operation that was attempted.
        action: &'static str,
        /// Phase the game was in.
        phase: RoundPhase,
    },
}

/// Owns one game session and exposes the operations a presentation drives.
#[derive(Debug)]
pub struct RoundController {
    world: World,
    clock: RoundClock,
    spawning: SpawnScheduler,
    classifier: DropClassifier,
    collision: CollisionResolver,
}

impl RoundController {
    /// Creates a controller on the start menu whose drops are drawn from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            world: World::new(),
            clock: RoundClock::new(),
            spawning: SpawnScheduler::new(),
            classifier: DropClassifier::new(seed),
            collision: CollisionResolver::new(),
        }
    }

    /// Read-only access to the authoritative world for ad-hoc queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current phase of the round state machine.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        query::phase(&self.world)
    }

    /// Outcome of the finished round while the result screen is showing.
    #[must_use]
    pub fn outcome(&self) -> Option<RoundOutcome> {
        query::outcome(&self.world)
    }

    /// Identifier of the most recently started round.
    #[must_use]
    pub fn round(&self) -> RoundId {
        query::round(&self.world)
    }

    /// Values for the heads-up display. Pure read.
    #[must_use]
    pub fn hud_snapshot(&self) -> HudSnapshot {
        query::hud_snapshot(&self.world)
    }

    /// Drops that are falling, or frozen in place once the round ended.
    pub fn in_flight(&self) -> impl Iterator<Item = &DropDescriptor> {
        query::in_flight_drops(&self.world)
    }

    /// Rounds the clock and the spawner are armed for, in that order.
    #[must_use]
    pub fn armed_timers(&self) -> (Option<RoundId>, Option<RoundId>) {
        (self.clock.armed_round(), self.spawning.armed_round())
    }

    /// Chooses the preset used by [`RoundController::start_selected_round`].
    pub fn select_difficulty(
        &mut self,
        preset: DifficultyPreset,
        out: &mut Vec<Event>,
    ) -> Result<(), RoundError> {
        self.require_idle("select a difficulty")?;
        self.execute(Command::SelectDifficulty { preset }, out);
        Ok(())
    }

    /// Replaces the play area used for placement and landing bounds.
    pub fn configure_play_area(&mut self, area: PlayArea, out: &mut Vec<Event>) {
        self.execute(Command::ConfigurePlayArea { area }, out);
    }

    /// Starts a round from the menu or the result screen.
    ///
    /// A profile that violates its invariants is rejected before any state
    /// changes.
    pub fn start_round(
        &mut self,
        profile: DifficultyProfile,
        out: &mut Vec<Event>,
    ) -> Result<RoundId, RoundError> {
        let mut events = Vec::new();
        self.execute(Command::StartRound { profile }, &mut events);
        let rejection = events.iter().find_map(|event| match event {
            Event::RoundStartRejected { reason } => Some(reason.clone()),
            _ => None,
        });
        out.append(&mut events);

        match rejection {
            Some(reason) => Err(reason.into()),
            None => {
                debug_assert_eq!(
                    self.armed_timers(),
                    (Some(self.round()), Some(self.round())),
                    "running round must arm clock and spawner"
                );
                Ok(self.round())
            }
        }
    }

    /// Starts a round with the preset chosen on the menu.
    pub fn start_selected_round(&mut self, out: &mut Vec<Event>) -> Result<RoundId, RoundError> {
        let profile = query::selected_preset(&self.world).profile();
        self.start_round(profile, out)
    }

    /// Plays the finished round again with the same profile.
    pub fn replay(&mut self, out: &mut Vec<Event>) -> Result<RoundId, RoundError> {
        let phase = self.phase();
        if phase != RoundPhase::Ended {
            return Err(RoundError::InvalidTransition {
                action: "replay",
                phase,
            });
        }
        let profile = *query::profile(&self.world);
        log::info!("replaying round {} with the same profile", self.round().get());
        self.start_round(profile, out)
    }

    /// Leaves the result screen for the start menu, resetting all round values.
    pub fn return_to_menu(&mut self, out: &mut Vec<Event>) -> Result<(), RoundError> {
        let phase = self.phase();
        if phase != RoundPhase::Ended {
            return Err(RoundError::InvalidTransition {
                action: "return to the menu",
                phase,
            });
        }
        self.execute(Command::ReturnToMenu, out);
        Ok(())
    }

    /// Advances simulated time, pumping the systems every [`SIMULATION_STEP`].
    ///
    /// Time stops counting the moment the round leaves the running phase, so
    /// nothing after the end of a round is observable in `out`.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let mut remaining = dt;
        while !remaining.is_zero() && self.phase() == RoundPhase::Running {
            let step = remaining.min(SIMULATION_STEP);
            remaining -= step;
            self.execute(Command::Tick { dt: step }, out);
        }
    }

    /// Reports that a drop finished falling while the catcher occupied `catcher`.
    ///
    /// Reports for unknown or already resolved drops, or arriving after the
    /// round stopped, are ignored.
    pub fn report_drop_landed(&mut self, drop: DropId, catcher: Rect, out: &mut Vec<Event>) {
        self.execute(Command::ReportDropLanded { drop, catcher }, out);
    }

    fn require_idle(&self, action: &'static str) -> Result<(), RoundError> {
        let phase = self.phase();
        if phase == RoundPhase::Running {
            return Err(RoundError::InvalidTransition { action, phase });
        }
        Ok(())
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            let mut commands = Vec::new();
            self.clock.handle(&events, &mut commands);
            self.spawning.handle(&events, &mut commands);
            let context = query::spawn_context(&self.world);
            self.classifier.handle(&events, &context, &mut commands);
            self.collision.handle(&events, &mut commands);

            queue.extend(commands);
            out.append(&mut events);
        }
    }
}
