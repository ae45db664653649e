use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use thiserror::Error;

/// Smallest operand produced by the built-in generators.
pub const OPERAND_MIN: u32 = 2;
/// Largest operand produced by the built-in generators.
pub const OPERAND_MAX: u32 = 9;

/// Number of exercises in a round unless the caller asks otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Mode token used when none is configured.
pub const DEFAULT_MODE: &str = "mixed:9";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("operands must be positive, got {a} x {b}")]
    NonPositiveOperand { a: u32, b: u32 },

    #[error("a batch must contain at least one exercise")]
    EmptyBatch,

    #[error("mode token must not be blank")]
    BlankMode,
}

/// An immutable operand pair. The expected answer is `a * b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawExercise")]
pub struct Exercise {
    a: u32,
    b: u32,
}

#[derive(Deserialize)]
struct RawExercise {
    a: u32,
    b: u32,
}

impl TryFrom<RawExercise> for Exercise {
    type Error = ExerciseError;

    fn try_from(raw: RawExercise) -> Result<Self, Self::Error> {
        Self::new(raw.a, raw.b)
    }
}

impl Exercise {
    /// # Errors
    ///
    /// Returns `ExerciseError::NonPositiveOperand` if either operand is zero.
    pub fn new(a: u32, b: u32) -> Result<Self, ExerciseError> {
        if a == 0 || b == 0 {
            return Err(ExerciseError::NonPositiveOperand { a, b });
        }
        Ok(Self { a, b })
    }

    #[must_use]
    pub fn from_nonzero(a: NonZeroU32, b: NonZeroU32) -> Self {
        Self {
            a: a.get(),
            b: b.get(),
        }
    }

    #[must_use]
    pub fn a(&self) -> u32 {
        self.a
    }

    #[must_use]
    pub fn b(&self) -> u32 {
        self.b
    }

    #[must_use]
    pub fn product(&self) -> i64 {
        i64::from(self.a) * i64::from(self.b)
    }

    /// True when `answer` equals the product. An unset answer counts as 0.
    #[must_use]
    pub fn is_answered_by(&self, answer: Option<i64>) -> bool {
        self.product() == answer.unwrap_or(0)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.a, self.b)
    }
}

/// Opaque generation strategy token, passed through to the exercise source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillMode(String);

impl DrillMode {
    /// # Errors
    ///
    /// Returns `ExerciseError::BlankMode` for an empty or whitespace-only token.
    pub fn new(token: impl Into<String>) -> Result<Self, ExerciseError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ExerciseError::BlankMode);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DrillMode {
    fn default() -> Self {
        Self(DEFAULT_MODE.to_owned())
    }
}

impl fmt::Display for DrillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated request for a new batch: `count` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    mode: DrillMode,
    count: usize,
}

impl BatchRequest {
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyBatch` when `count` is zero.
    pub fn new(mode: DrillMode, count: usize) -> Result<Self, ExerciseError> {
        if count == 0 {
            return Err(ExerciseError::EmptyBatch);
        }
        Ok(Self { mode, count })
    }

    #[must_use]
    pub fn mode(&self) -> &DrillMode {
        &self.mode
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}
