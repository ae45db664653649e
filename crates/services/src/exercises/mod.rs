//! Where batches come from: a remote generator, the local table generator, and
//! the fallback used whenever either of them fails.

use std::num::NonZeroU32;

use async_trait::async_trait;
use drill_core::model::{BatchRequest, Exercise};

use crate::error::ExerciseSourceError;

mod fallback;
mod http;
mod table;

pub use fallback::FallbackGenerator;
pub use http::{ExerciseSourceConfig, HttpExerciseSource};
pub use table::TableExerciseSource;

/// Supplies a batch for a mode token and count. May fail; callers fall back.
#[async_trait]
pub trait ExerciseSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExerciseSourceError` when no usable batch can be produced.
    async fn generate(&self, request: &BatchRequest) -> Result<Vec<Exercise>, ExerciseSourceError>;
}

/// Builds an exercise from operands the generators already keep in `2..=9`.
pub(crate) fn drill_exercise(a: u32, b: u32) -> Exercise {
    let operand = |v: u32| NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN);
    Exercise::from_nonzero(operand(a), operand(b))
}
