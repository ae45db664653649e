use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ScoreResult;

/// Achievement updated after every graded batch.
pub const PROBLEM_SOLVER: &str = "Problem Solver";
/// Achievement seeded at 0 when an account is created.
pub const NEWCOMER: &str = "Newcomer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AchievementError {
    #[error("progress must be between 0 and 100, got {0}")]
    OutOfRange(i64),

    #[error("cannot derive progress from an empty score")]
    EmptyScore,

    #[error("achievement name must not be blank")]
    BlankName,
}

/// Percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Self = Self(0);
    pub const COMPLETE: Self = Self(100);

    /// # Errors
    ///
    /// Returns `AchievementError::OutOfRange` outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, AchievementError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Self)
            .ok_or(AchievementError::OutOfRange(value))
    }

    /// `min(100, floor(correct / total * 100))`, computed in integers.
    ///
    /// # Errors
    ///
    /// Returns `AchievementError::EmptyScore` when the score covers no items.
    pub fn from_score(score: &ScoreResult) -> Result<Self, AchievementError> {
        if score.total() == 0 {
            return Err(AchievementError::EmptyScore);
        }
        let percent = score.correct_count().saturating_mul(100) / score.total();
        let clamped = u8::try_from(percent.min(100)).unwrap_or(100);
        Ok(Self(clamped))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= 100
    }
}

impl TryFrom<i64> for Progress {
    type Error = AchievementError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Progress> for i64 {
    fn from(value: Progress) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Progress of one named achievement for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub name: String,
    pub progress: Progress,
}

impl AchievementProgress {
    /// # Errors
    ///
    /// Returns `AchievementError::BlankName` for an empty name.
    pub fn new(name: impl Into<String>, progress: Progress) -> Result<Self, AchievementError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AchievementError::BlankName);
        }
        Ok(Self { name, progress })
    }
}
