#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! End-of-fall collision resolution between landed drops and the catcher.

use drop_catcher_core::{
    CatchEffect, Command, DropCategory, Event, FeedbackKind, Rect, ACCUMULATOR_STEP,
};

/// Consequence of catching a clean drop.
pub const CLEAN_CATCH: CatchEffect = CatchEffect {
    score_delta: 1,
    pollution_gain: 0,
    clean_gain: ACCUMULATOR_STEP,
    dirty_gain: 0,
    escalates: false,
    feedback: &[FeedbackKind::Positive],
};

/// Consequence of catching a dirty drop.
pub const DIRTY_CATCH: CatchEffect = CatchEffect {
    score_delta: -1,
    pollution_gain: ACCUMULATOR_STEP,
    clean_gain: 0,
    dirty_gain: ACCUMULATOR_STEP,
    escalates: false,
    feedback: &[FeedbackKind::Negative],
};

/// Consequence of catching an obstacle.
pub const OBSTACLE_CATCH: CatchEffect = CatchEffect {
    score_delta: -2,
    pollution_gain: 0,
    clean_gain: 0,
    dirty_gain: 0,
    escalates: true,
    feedback: &[FeedbackKind::Boost, FeedbackKind::Negative],
};

/// Pure system turning [`Event::DropLanded`] into [`Command::ApplyCatch`] on overlap.
///
/// Misses produce no command: the world already retired the drop when it
/// reported the landing, so every drop is resolved at most once.
#[derive(Debug, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Creates a new collision resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a catch for every landed drop whose bounds overlap the catcher.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if let Event::DropLanded {
                round,
                drop,
                category,
                bounds,
                catcher,
            } = event
            {
                if overlaps(bounds, catcher) {
                    out.push(Command::ApplyCatch {
                        round: *round,
                        drop: *drop,
                        category: *category,
                        effect: consequence_for(*category),
                    });
                }
            }
        }
    }
}

/// Reports whether a landed drop touches the catcher.
///
/// The bottom edge test is inclusive while the side tests are strict, so a
/// drop resting exactly on the catcher's top counts as a hit but one merely
/// grazing a side edge does not.
#[must_use]
pub fn overlaps(drop: &Rect, catcher: &Rect) -> bool {
    drop.bottom() >= catcher.top() && drop.left() < catcher.right() && drop.right() > catcher.left()
}

/// Effect applied when a drop of `category` is caught.
#[must_use]
pub const fn consequence_for(category: DropCategory) -> CatchEffect {
    match category {
        DropCategory::Clean => CLEAN_CATCH,
        DropCategory::Dirty => DIRTY_CATCH,
        DropCategory::Obstacle => OBSTACLE_CATCH,
    }
}
