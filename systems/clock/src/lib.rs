#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round clock that converts elapsed simulation time into whole-second ticks.

use std::time::Duration;

use drop_catcher_core::{Command, Event, RoundId};

/// Nominal period between clock ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Pure system that emits one [`Command::ClockTick`] per elapsed second.
///
/// The clock is armed only between [`Event::RoundStarted`] and the matching
/// [`Event::RoundEnded`]. Disarming drops any partially elapsed second.
#[derive(Debug, Default)]
pub struct RoundClock {
    armed: Option<RoundId>,
    accumulator: Duration,
}

impl RoundClock {
    /// Creates a disarmed clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Round the clock is currently armed for, if any.
    #[must_use]
    pub const fn armed_round(&self) -> Option<RoundId> {
        self.armed
    }

    /// Consumes world events and emits clock ticks for every full second.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted { round, .. } => {
                    self.armed = Some(*round);
                    self.accumulator = Duration::ZERO;
                }
                Event::RoundEnded { .. } | Event::ReturnedToMenu => {
                    self.armed = None;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => {
                    let Some(round) = self.armed else {
                        continue;
                    };
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    while self.accumulator >= TICK_PERIOD {
                        self.accumulator -= TICK_PERIOD;
                        out.push(Command::ClockTick { round });
                    }
                }
                _ => {}
            }
        }
    }
}
