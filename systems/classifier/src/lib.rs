#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drop classifier deciding the category, size, placement and fall time of each spawn.

use std::{ops::Range, time::Duration};

use drop_catcher_core::{Command, DropCategory, DropSpec, Event, SpawnContext};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Range of unscaled fall durations in seconds.
pub const BASE_FALL_SECONDS: Range<f64> = 1.2..2.4;

/// Shortest fall any escalation can produce, in seconds.
pub const MIN_FALL_SECONDS: f64 = 0.5;

/// Smallest rendered drop edge in pixels.
pub const MIN_DROP_SIZE: f32 = 28.0;

/// Spread added on top of [`MIN_DROP_SIZE`].
pub const DROP_SIZE_SPREAD: f32 = 22.0;

/// Seeded system that answers [`Event::SpawnRequested`] with [`Command::SpawnDrop`].
#[derive(Debug)]
pub struct DropClassifier {
    rng: ChaCha8Rng,
}

impl DropClassifier {
    /// Creates a classifier whose draws are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Classifies one drop for every spawn slot opened for the context's round.
    pub fn handle(&mut self, events: &[Event], context: &SpawnContext, out: &mut Vec<Command>) {
        for event in events {
            if let Event::SpawnRequested { round } = event {
                if *round != context.round {
                    continue;
                }
                out.push(Command::SpawnDrop {
                    round: *round,
                    spec: self.classify(context),
                });
            }
        }
    }

    /// Draws a complete drop description.
    pub fn classify(&mut self, context: &SpawnContext) -> DropSpec {
        let rng = &mut self.rng;
        let first = rng.gen::<f64>();
        let category = category_for(
            context.obstacle_probability,
            context.clean_probability,
            first,
            || rng.gen::<f64>(),
        );

        let size = MIN_DROP_SIZE + (rng.gen::<f32>() * DROP_SIZE_SPREAD).round();
        let span = (context.play_area.width() - size).max(0.0);
        let left = (rng.gen::<f32>() * span).round();

        let base = rng.gen_range(BASE_FALL_SECONDS);
        DropSpec {
            category,
            left,
            size,
            fall_duration: fall_duration_for(base, context.speed_multiplier),
        }
    }
}

/// Two-stage category split.
///
/// `first` decides obstacle versus non-obstacle; only non-obstacles consume
/// the `second` draw, which splits clean from dirty. The clean share of
/// non-obstacle drops is therefore exactly `clean_probability`.
pub fn category_for(
    obstacle_probability: f64,
    clean_probability: f64,
    first: f64,
    second: impl FnOnce() -> f64,
) -> DropCategory {
    if first < obstacle_probability {
        DropCategory::Obstacle
    } else if second() < clean_probability {
        DropCategory::Clean
    } else {
        DropCategory::Dirty
    }
}

/// Scales an unscaled fall time by the speed multiplier, never going below the floor.
#[must_use]
pub fn fall_duration_for(base_seconds: f64, speed_multiplier: f64) -> Duration {
    Duration::from_secs_f64((base_seconds / speed_multiplier).max(MIN_FALL_SECONDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_draw_skips_the_second_stage() {
        let category = category_for(0.15, 0.65, 0.1, || panic!("second draw consumed"));
        assert_eq!(category, DropCategory::Obstacle);
    }

    #[test]
    fn second_stage_splits_clean_from_dirty() {
        assert_eq!(category_for(0.15, 0.65, 0.15, || 0.64), DropCategory::Clean);
        assert_eq!(category_for(0.15, 0.65, 0.99, || 0.65), DropCategory::Dirty);
    }

    #[test]
    fn zero_obstacle_probability_never_yields_obstacles() {
        assert_eq!(category_for(0.0, 1.0, 0.0, || 0.5), DropCategory::Clean);
    }

    #[test]
    fn fall_duration_scales_and_floors() {
        assert_eq!(fall_duration_for(2.0, 1.0), Duration::from_secs(2));
        assert_eq!(fall_duration_for(2.0, 2.0), Duration::from_secs(1));
        assert_eq!(fall_duration_for(1.2, 4.0), Duration::from_millis(500));
    }
}
