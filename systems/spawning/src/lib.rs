#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn scheduler that requests new drops at the round's current cadence.

use std::time::Duration;

use drop_catcher_core::{Command, Event, RoundId};

/// Pure system that emits spawn requests while a round is running.
///
/// The scheduler arms itself from [`Event::RoundStarted`], re-arms on
/// [`Event::DifficultyEscalated`] and disarms when the round ends or the game
/// returns to the menu. Re-arming discards the partially elapsed wait, so the
/// first spawn after an escalation happens one full new interval later.
#[derive(Debug, Default)]
pub struct SpawnScheduler {
    armed: Option<RoundId>,
    spawn_interval: Duration,
    accumulator: Duration,
}

impl SpawnScheduler {
    /// Creates a disarmed scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Round the scheduler is currently armed for, if any.
    #[must_use]
    pub const fn armed_round(&self) -> Option<RoundId> {
        self.armed
    }

    /// Interval the scheduler is waiting on.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Consumes world events and emits spawn requests for elapsed intervals.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted {
                    round,
                    spawn_interval,
                    ..
                } => self.arm(*round, *spawn_interval),
                Event::DifficultyEscalated {
                    round,
                    spawn_interval,
                    ..
                } if self.armed == Some(*round) => self.arm(*round, *spawn_interval),
                Event::RoundEnded { .. } | Event::ReturnedToMenu => self.disarm(),
                Event::TimeAdvanced { dt } => {
                    let Some(round) = self.armed else {
                        continue;
                    };
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    for _ in 0..self.resolve_spawn_attempts() {
                        out.push(Command::RequestSpawn { round });
                    }
                }
                _ => {}
            }
        }
    }

    fn arm(&mut self, round: RoundId, spawn_interval: Duration) {
        self.armed = Some(round);
        self.spawn_interval = spawn_interval;
        self.accumulator = Duration::ZERO;
    }

    fn disarm(&mut self) {
        self.armed = None;
        self.accumulator = Duration::ZERO;
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let mut scheduler = SpawnScheduler::new();
        scheduler.accumulator = Duration::from_secs(10);
        assert_eq!(scheduler.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn keeps_remainder_between_attempts() {
        let mut scheduler = SpawnScheduler::new();
        scheduler.arm(RoundId::new(1), Duration::from_millis(600));
        scheduler.accumulator = Duration::from_millis(1_300);
        assert_eq!(scheduler.resolve_spawn_attempts(), 2);
        assert_eq!(scheduler.accumulator, Duration::from_millis(100));
    }
}
