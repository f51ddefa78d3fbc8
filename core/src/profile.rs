//! Difficulty profiles and the named presets offered before a round starts.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable bundle of tunables selected once per round.
///
/// Profiles are plain data so adapters can load custom ones from configuration
/// files. Nothing is corrected silently: call [`DifficultyProfile::validate`]
/// (the world does so when a round starts) to reject malformed values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Length of the round measured in whole seconds.
    pub duration_secs: u32,
    /// Gap between spawns when the round starts, in milliseconds.
    pub base_spawn_interval_ms: u64,
    /// Probability that a non-obstacle drop is clean.
    pub clean_probability: f64,
    /// Probability that any drop is an obstacle, evaluated first.
    pub obstacle_probability: f64,
    /// Floor the spawn gap can shrink to, in milliseconds.
    pub min_spawn_interval_ms: u64,
    /// Amount added to the speed multiplier by each obstacle hit.
    pub speed_step: f64,
}

impl DifficultyProfile {
    /// Relaxed preset with a longer round and fewer obstacles.
    pub const EASY: Self = Self {
        duration_secs: 35,
        base_spawn_interval_ms: 650,
        clean_probability: 0.70,
        obstacle_probability: 0.10,
        min_spawn_interval_ms: 260,
        speed_step: 0.12,
    };

    /// Default preset.
    pub const NORMAL: Self = Self {
        duration_secs: 30,
        base_spawn_interval_ms: 600,
        clean_probability: 0.65,
        obstacle_probability: 0.15,
        min_spawn_interval_ms: 250,
        speed_step: 0.15,
    };

    /// Short round with dense spawns and frequent obstacles.
    pub const HARD: Self = Self {
        duration_secs: 25,
        base_spawn_interval_ms: 520,
        clean_probability: 0.58,
        obstacle_probability: 0.20,
        min_spawn_interval_ms: 220,
        speed_step: 0.18,
    };

    /// Spawn gap applied when the round starts.
    #[must_use]
    pub const fn base_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.base_spawn_interval_ms)
    }

    /// Smallest spawn gap escalation may reach.
    #[must_use]
    pub const fn min_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.min_spawn_interval_ms)
    }

    /// Checks every invariant, reporting the first violation found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.duration_secs == 0 {
            return Err(ProfileError::ZeroDuration);
        }
        if self.base_spawn_interval_ms == 0 {
            return Err(ProfileError::ZeroSpawnInterval);
        }
        if self.min_spawn_interval_ms == 0 {
            return Err(ProfileError::ZeroMinSpawnInterval);
        }
        if self.min_spawn_interval_ms > self.base_spawn_interval_ms {
            return Err(ProfileError::MinIntervalExceedsBase {
                min_ms: self.min_spawn_interval_ms,
                base_ms: self.base_spawn_interval_ms,
            });
        }
        check_probability("clean_probability", self.clean_probability)?;
        check_probability("obstacle_probability", self.obstacle_probability)?;
        if !(self.speed_step.is_finite() && self.speed_step > 0.0) {
            return Err(ProfileError::NonPositiveSpeedStep {
                value: self.speed_step,
            });
        }
        Ok(())
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::NORMAL
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ProfileError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::ProbabilityOutOfRange { field, value })
    }
}

/// Invariant violations detected in a [`DifficultyProfile`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    /// The round would last zero seconds.
    #[error("round duration must be at least one second")]
    ZeroDuration,
    /// The starting spawn gap is zero.
    #[error("base spawn interval must be positive")]
    ZeroSpawnInterval,
    /// The spawn gap floor is zero.
    #[error("minimum spawn interval must be positive")]
    ZeroMinSpawnInterval,
    /// The floor sits above the starting gap.
    #[error("minimum spawn interval {min_ms}ms exceeds base interval {base_ms}ms")]
    MinIntervalExceedsBase {
        /// Configured floor in milliseconds.
        min_ms: u64,
        /// Configured starting gap in milliseconds.
        base_ms: u64,
    },
    /// A probability lies outside `[0, 1]` or is not a number.
    #[error("{field} must lie within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The escalation step is zero, negative or not finite.
    #[error("speed step must be a positive finite number, got {value}")]
    NonPositiveSpeedStep {
        /// Rejected value.
        value: f64,
    },
}

/// Named difficulty presets selectable from the menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreset {
    /// See [`DifficultyProfile::EASY`].
    Easy,
    /// See [`DifficultyProfile::NORMAL`].
    #[default]
    Normal,
    /// See [`DifficultyProfile::HARD`].
    Hard,
}

impl DifficultyPreset {
    /// Every preset in menu order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Profile fully described by the preset.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile::EASY,
            Self::Normal => DifficultyProfile::NORMAL,
            Self::Hard => DifficultyProfile::HARD,
        }
    }

    /// Lowercase identifier used by menus and command lines.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifficultyPreset {
    type Err = UnknownPreset;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPreset(wanted.to_owned()))
    }
}

/// Raised when a preset name does not match any [`DifficultyPreset`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`, expected one of easy, normal, hard")]
pub struct UnknownPreset(pub String);
