//! Scripted catcher that stands in for a player when no display is attached.

use std::time::Duration;

use drop_catcher_core::{Catcher, DropCategory, DropDescriptor, DropId, Event, PlayArea, Rect};

#[derive(Clone, Copy, Debug)]
struct Falling {
    drop: DropDescriptor,
    lands_at: Duration,
}

/// Follows spawned drops, slides towards the next clean one and reports landings.
#[derive(Debug)]
pub(crate) struct Autopilot {
    catcher: Catcher,
    area: PlayArea,
    speed: f32,
    center_x: f32,
    clock: Duration,
    falling: Vec<Falling>,
}

impl Autopilot {
    /// Creates an autopilot parking `catcher` in the middle of `area`.
    ///
    /// `speed` is the catcher's top speed in pixels per simulated second.
    pub(crate) fn new(area: PlayArea, catcher: Catcher, speed: f32) -> Self {
        Self {
            catcher,
            area,
            speed,
            center_x: area.width() / 2.0,
            clock: Duration::ZERO,
            falling: Vec::new(),
        }
    }

    /// Moves the simulated clock by `dt` and tracks drops announced during it.
    ///
    /// `events` must be exactly what the controller emitted while advancing by
    /// `dt`. Spawns land at the end of the controller step that produced them,
    /// so feeding steps no longer than the controller's sub-step keeps landing
    /// times exact.
    pub(crate) fn observe(&mut self, dt: Duration, events: &[Event]) {
        self.clock += dt;
        for event in events {
            match event {
                Event::RoundStarted { .. } => {
                    self.clock = Duration::ZERO;
                    self.falling.clear();
                }
                Event::DropSpawned { drop, .. } => self.falling.push(Falling {
                    drop: *drop,
                    lands_at: self.clock + drop.fall_duration,
                }),
                _ => {}
            }
        }
    }

    /// Moves the catcher for `dt` and returns the drops whose fall completed.
    ///
    /// Landings come back in the order they happened, each paired with the
    /// catcher bounds after the move.
    pub(crate) fn steer(&mut self, dt: Duration) -> Vec<(DropId, Rect)> {
        if let Some(target) = self.target() {
            let reach = self.speed * dt.as_secs_f32();
            self.center_x += (target - self.center_x).clamp(-reach, reach);
        }
        let bounds = self.catcher.bounds_at(self.center_x, self.area);
        self.center_x = bounds.center_x();

        let clock = self.clock;
        let (mut landed, falling): (Vec<_>, Vec<_>) = self
            .falling
            .drain(..)
            .partition(|falling| falling.lands_at <= clock);
        self.falling = falling;
        landed.sort_by_key(|falling| falling.lands_at);
        landed
            .into_iter()
            .map(|falling| (falling.drop.id, bounds))
            .collect()
    }

    fn target(&self) -> Option<f32> {
        self.falling
            .iter()
            .filter(|falling| falling.drop.category == DropCategory::Clean)
            .min_by_key(|falling| falling.lands_at)
            .map(|falling| falling.drop.left + falling.drop.size / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drop_catcher_core::{DifficultyProfile, DropSpec, RoundId};

    fn spawned(id: u32, category: DropCategory, left: f32, fall_ms: u64) -> Event {
        Event::DropSpawned {
            round: RoundId::new(1),
            drop: DropDescriptor::from_spec(
                DropId::new(id),
                DropSpec {
                    category,
                    left,
                    size: 30.0,
                    fall_duration: Duration::from_millis(fall_ms),
                },
            ),
        }
    }

    fn pilot(speed: f32) -> Autopilot {
        Autopilot::new(PlayArea::DEFAULT, Catcher::DEFAULT, speed)
    }

    #[test]
    fn reports_a_drop_once_its_fall_completes() {
        let mut autopilot = pilot(400.0);
        autopilot.observe(Duration::ZERO, &[spawned(1, DropCategory::Dirty, 10.0, 1_000)]);

        autopilot.observe(Duration::from_millis(990), &[]);
        assert!(autopilot.steer(Duration::from_millis(990)).is_empty());
        autopilot.observe(Duration::from_millis(10), &[]);
        let landed = autopilot.steer(Duration::from_millis(10));
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].0, DropId::new(1));

        autopilot.observe(Duration::from_secs(1), &[]);
        assert!(autopilot.steer(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn spawn_time_counts_towards_the_landing() {
        let mut autopilot = pilot(400.0);
        autopilot.observe(
            Duration::from_millis(600),
            &[spawned(1, DropCategory::Clean, 10.0, 1_463)],
        );

        autopilot.observe(Duration::from_millis(863), &[]);
        assert!(
            autopilot.steer(Duration::from_millis(863)).is_empty(),
            "fall started 600ms into the round"
        );
        autopilot.observe(Duration::from_millis(600), &[]);
        let landed = autopilot.steer(Duration::from_millis(600));
        assert_eq!(landed.len(), 1);
    }

    #[test]
    fn chases_the_clean_drop_that_lands_first() {
        let mut autopilot = pilot(1_000.0);
        autopilot.observe(
            Duration::ZERO,
            &[
                spawned(1, DropCategory::Dirty, 300.0, 500),
                spawned(2, DropCategory::Clean, 0.0, 1_500),
                spawned(3, DropCategory::Clean, 300.0, 2_000),
            ],
        );

        autopilot.observe(Duration::from_millis(1_000), &[]);
        let _ = autopilot.steer(Duration::from_millis(1_000));
        autopilot.observe(Duration::from_millis(500), &[]);
        let landed = autopilot.steer(Duration::from_millis(500));
        assert_eq!(landed.len(), 1);
        let (drop, catcher) = landed[0];
        assert_eq!(drop, DropId::new(2));
        assert_eq!(catcher.left(), 0.0);
    }

    #[test]
    fn movement_is_limited_by_speed() {
        let mut autopilot = pilot(100.0);
        autopilot.observe(Duration::ZERO, &[spawned(1, DropCategory::Clean, 0.0, 5_000)]);

        let _ = autopilot.steer(Duration::from_millis(500));
        assert_eq!(autopilot.center_x, 130.0);
    }

    #[test]
    fn a_new_round_forgets_previous_drops() {
        let mut autopilot = pilot(100.0);
        autopilot.observe(Duration::ZERO, &[spawned(1, DropCategory::Clean, 0.0, 100)]);
        autopilot.observe(
            Duration::ZERO,
            &[Event::RoundStarted {
                round: RoundId::new(2),
                profile: DifficultyProfile::NORMAL,
                spawn_interval: Duration::from_millis(600),
            }],
        );

        autopilot.observe(Duration::from_secs(1), &[]);
        assert!(autopilot.steer(Duration::from_secs(1)).is_empty());
    }
}
