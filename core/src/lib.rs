#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Drop Catcher engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod profile;

pub use profile::{DifficultyPreset, DifficultyProfile, ProfileError, UnknownPreset};

/// Upper bound shared by pollution and the clean/dirty quality accumulators.
pub const ACCUMULATOR_LIMIT: u32 = 100;

/// Amount a single hit adds to pollution or to a quality accumulator.
pub const ACCUMULATOR_STEP: u32 = 10;

/// Reduction applied to the spawn gap by each obstacle hit.
pub const SPAWN_INTERVAL_STEP: Duration = Duration::from_millis(80);

/// Describes where the round state machine currently sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting on the start menu for a difficulty and a start request.
    #[default]
    Menu,
    /// Clock and spawner are armed and drops are falling.
    Running,
    /// The round finished; the result screen is showing.
    Ended,
}

/// How a finished round concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The clock ran out before pollution maxed out. Counts as a win.
    Survived,
    /// Pollution reached its limit before the clock ran out.
    PollutionMaxedOut,
}

/// Generation counter identifying one running period.
///
/// The world bumps it each time a round starts so commands issued for an
/// earlier round can be recognised and dropped.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoundId(u32);

impl RoundId {
    /// Creates a new round identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the round that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Unique identifier assigned to a spawned drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DropId(u32);

impl DropId {
    /// Creates a new drop identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Category assigned to a drop when it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DropCategory {
    /// Beneficial drop worth catching.
    Clean,
    /// Harmful drop that pollutes when caught.
    Dirty,
    /// Hazard that costs score and escalates difficulty when caught.
    Obstacle,
}

/// Transient presentation cue emitted alongside a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackKind {
    /// Catcher flash and score pop after a clean hit.
    Positive,
    /// Quality bar shake after a dirty or obstacle hit.
    Negative,
    /// Speed-up badge after an obstacle hit.
    Boost,
}

impl FeedbackKind {
    /// How long the presentation should keep the cue visible. Advisory only.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Positive => Duration::from_millis(500),
            Self::Negative => Duration::from_millis(520),
            Self::Boost => Duration::from_millis(750),
        }
    }
}

/// State consequence of catching a drop, applied atomically by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CatchEffect {
    /// Signed change applied to the score before clamping at zero.
    pub score_delta: i32,
    /// Amount added to pollution before clamping at [`ACCUMULATOR_LIMIT`].
    pub pollution_gain: u32,
    /// Amount added to the clean accumulator before clamping.
    pub clean_gain: u32,
    /// Amount added to the dirty accumulator before clamping.
    pub dirty_gain: u32,
    /// Whether the hit raises the speed multiplier and shrinks the spawn gap.
    pub escalates: bool,
    /// Cues emitted to the presentation, in order.
    pub feedback: &'static [FeedbackKind],
}

/// Axis-aligned rectangle in play-area pixels, `y` growing downwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    /// Creates a rectangle from its four edges.
    #[must_use]
    pub const fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from its upper-left corner and dimensions.
    #[must_use]
    pub fn from_origin_and_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::from_edges(left, top, left + width, top + height)
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    /// Right edge.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    /// Bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Horizontal midpoint.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// Dimensions of the vertical play area drops fall through.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayArea {
    width: f32,
    height: f32,
}

impl PlayArea {
    /// Play area used until an adapter configures its own.
    pub const DEFAULT: Self = Self {
        width: 360.0,
        height: 640.0,
    };

    /// Creates a play area, rejecting non-positive or non-finite dimensions.
    pub fn new(width: f32, height: f32) -> Result<Self, PlayAreaError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(PlayAreaError { width, height })
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Raised when play area dimensions are unusable.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("play area must have positive finite dimensions, got {width}x{height}")]
pub struct PlayAreaError {
    /// Rejected width.
    pub width: f32,
    /// Rejected height.
    pub height: f32,
}

/// Raised when catcher dimensions are unusable.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("catcher must have positive finite dimensions, got {width}x{height}")]
pub struct CatcherError {
    /// Rejected width.
    pub width: f32,
    /// Rejected height.
    pub height: f32,
}

/// The player-controlled interception target resting on the floor of the play area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Catcher {
    width: f32,
    height: f32,
}

impl Catcher {
    /// Catcher dimensions used when an adapter does not measure its own.
    pub const DEFAULT: Self = Self {
        width: 120.0,
        height: 90.0,
    };

    /// Creates a catcher, rejecting non-positive or non-finite dimensions.
    pub fn new(width: f32, height: f32) -> Result<Self, CatcherError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(CatcherError { width, height })
        }
    }

    /// Rendered width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Bounding box for a catcher centred on `center_x`, kept inside the play area.
    #[must_use]
    pub fn bounds_at(&self, center_x: f32, area: PlayArea) -> Rect {
        let max_left = (area.width() - self.width).max(0.0);
        let left = (center_x - self.width / 2.0).clamp(0.0, max_left);
        Rect::from_edges(
            left,
            area.height() - self.height,
            left + self.width,
            area.height(),
        )
    }
}

impl Default for Catcher {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classification produced for a drop before the world assigns it an identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropSpec {
    /// Category decided by the classifier.
    pub category: DropCategory,
    /// Horizontal offset of the drop's left edge in pixels.
    pub left: f32,
    /// Rendered edge length of the square drop in pixels.
    pub size: f32,
    /// Time the drop takes to fall to the floor.
    pub fall_duration: Duration,
}

/// Immutable description of a spawned drop handed to the presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropDescriptor {
    /// Identifier allocated by the world.
    pub id: DropId,
    /// Category decided by the classifier.
    pub category: DropCategory,
    /// Horizontal offset of the drop's left edge in pixels.
    pub left: f32,
    /// Rendered edge length of the square drop in pixels.
    pub size: f32,
    /// Time the drop takes to fall to the floor.
    pub fall_duration: Duration,
}

impl DropDescriptor {
    /// Attaches an identifier to a classified drop.
    #[must_use]
    pub const fn from_spec(id: DropId, spec: DropSpec) -> Self {
        Self {
            id,
            category: spec.category,
            left: spec.left,
            size: spec.size,
            fall_duration: spec.fall_duration,
        }
    }

    /// Bounding box of the drop once its fall has completed.
    #[must_use]
    pub fn landing_bounds(&self, area: PlayArea) -> Rect {
        Rect::from_origin_and_size(
            self.left,
            area.height() - self.size,
            self.size,
            self.size,
        )
    }
}

/// Values the classifier needs to describe the next drop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnContext {
    /// Round currently accepting spawns.
    pub round: RoundId,
    /// Probability of an obstacle, evaluated first.
    pub obstacle_probability: f64,
    /// Probability of a clean drop among non-obstacles.
    pub clean_probability: f64,
    /// Current divisor applied to base fall durations.
    pub speed_multiplier: f64,
    /// Area the drop must fit inside.
    pub play_area: PlayArea,
}

/// Read-only values the presentation renders in its heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HudSnapshot {
    /// Remaining time as a fraction of the round length, `0.0..=1.0`.
    pub remaining_fraction: f32,
    /// Share of clean hits in the quality bar.
    pub clean_percent: u32,
    /// Share of dirty hits in the quality bar.
    pub dirty_percent: u32,
    /// Current score.
    pub score: u32,
    /// Current pollution, `0..=100`.
    pub pollution: u32,
}

/// Splits the quality accumulators into percentages that sum to 100.
///
/// The clean share is rounded half up and the dirty share takes the
/// remainder. Both are zero before any clean or dirty hit.
#[must_use]
pub fn quality_percentages(clean: u32, dirty: u32) -> (u32, u32) {
    let total = u64::from(clean) + u64::from(dirty);
    if total == 0 {
        return (0, 0);
    }
    let clean_percent = (u64::from(clean) * 200 + total) / (2 * total);
    let clean_percent = u32::try_from(clean_percent).unwrap_or(100);
    (clean_percent, 100 - clean_percent)
}

/// Reasons the world refuses to start a round.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StartRejection {
    /// Rounds only start from the menu or the result screen.
    #[error("a round cannot start while the game is {phase:?}")]
    InvalidPhase {
        /// Phase the world was in.
        phase: RoundPhase,
    },
    /// The supplied profile violates its invariants.
    #[error("difficulty profile rejected: {0}")]
    InvalidProfile(#[from] ProfileError),
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Chooses the preset used by the next round started from the menu.
    SelectDifficulty {
        /// Preset to remember.
        preset: DifficultyPreset,
    },
    /// Replaces the play area used for drop placement and landing bounds.
    ConfigurePlayArea {
        /// New play area dimensions.
        area: PlayArea,
    },
    /// Resets the round state from the profile and enters the running phase.
    StartRound {
        /// Profile governing the new round.
        profile: DifficultyProfile,
    },
    /// Leaves the result screen for the start menu.
    ReturnToMenu,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Consumes one second of the round's time budget.
    ClockTick {
        /// Round the clock was armed for.
        round: RoundId,
    },
    /// Asks the world to open a spawn slot.
    RequestSpawn {
        /// Round the spawner was armed for.
        round: RoundId,
    },
    /// Inserts a classified drop into the play area.
    SpawnDrop {
        /// Round the spawn slot belonged to.
        round: RoundId,
        /// Classification for the new drop.
        spec: DropSpec,
    },
    /// Reports that a drop's fall finished with the catcher at the given bounds.
    ReportDropLanded {
        /// Drop whose fall completed.
        drop: DropId,
        /// Catcher bounding box sampled at landing time.
        catcher: Rect,
    },
    /// Applies the consequence of a drop landing on the catcher.
    ApplyCatch {
        /// Round the drop belonged to.
        round: RoundId,
        /// Drop that was caught.
        drop: DropId,
        /// Category of the caught drop.
        category: DropCategory,
        /// Consequence chosen by the collision resolver.
        effect: CatchEffect,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms the preset the next menu start will use.
    DifficultySelected {
        /// Preset that was selected.
        preset: DifficultyPreset,
    },
    /// Confirms a new play area.
    PlayAreaConfigured {
        /// Dimensions now in effect.
        area: PlayArea,
    },
    /// Announces that a round entered the running phase.
    RoundStarted {
        /// Identifier of the new round.
        round: RoundId,
        /// Profile governing the round.
        profile: DifficultyProfile,
        /// Spawn gap the spawner should arm with.
        spawn_interval: Duration,
    },
    /// Reports that a start request was refused.
    RoundStartRejected {
        /// Why the round did not start.
        reason: StartRejection,
    },
    /// Indicates that simulated time passed while a round was running.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that one second of the round elapsed.
    ClockTicked {
        /// Round the tick applied to.
        round: RoundId,
        /// Whole seconds left in the round.
        remaining_seconds: u32,
    },
    /// Opens a spawn slot the classifier should fill.
    SpawnRequested {
        /// Round the slot belongs to.
        round: RoundId,
    },
    /// Announces a new falling drop the presentation should render.
    DropSpawned {
        /// Round the drop belongs to.
        round: RoundId,
        /// Description of the drop.
        drop: DropDescriptor,
    },
    /// Confirms that a drop finished falling and was retired.
    DropLanded {
        /// Round the drop belonged to.
        round: RoundId,
        /// Retired drop.
        drop: DropId,
        /// Category of the retired drop.
        category: DropCategory,
        /// Drop bounding box at the end of its fall.
        bounds: Rect,
        /// Catcher bounding box sampled at landing time.
        catcher: Rect,
    },
    /// Confirms that a landed drop hit the catcher.
    DropCaught {
        /// Round the drop belonged to.
        round: RoundId,
        /// Drop that was caught.
        drop: DropId,
        /// Category of the caught drop.
        category: DropCategory,
    },
    /// Reports the score after a hit.
    ScoreChanged {
        /// Score after clamping.
        score: u32,
    },
    /// Reports pollution after a harmful hit.
    PollutionChanged {
        /// Pollution after clamping.
        pollution: u32,
    },
    /// Announces faster falls and a shorter spawn gap after an obstacle hit.
    DifficultyEscalated {
        /// Round the escalation applies to.
        round: RoundId,
        /// New fall speed divisor.
        speed_multiplier: f64,
        /// New spawn gap the spawner must re-arm with.
        spawn_interval: Duration,
    },
    /// Transient presentation cue.
    Feedback {
        /// Cue to display.
        kind: FeedbackKind,
    },
    /// Announces that the round left the running phase.
    RoundEnded {
        /// Round that ended.
        round: RoundId,
        /// Final score.
        score: u32,
        /// How the round concluded.
        outcome: RoundOutcome,
    },
    /// Confirms that the world is back on the start menu.
    ReturnedToMenu,
}
