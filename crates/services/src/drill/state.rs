use std::fmt;

use drill_core::model::{AnswerBuffer, Exercise, ExerciseError, ScoreResult, SessionPhase};
use drill_core::scoring;

use crate::error::DrillError;

//
// ─── BATCH TICKETS ─────────────────────────────────────────────────────────────
//

/// Generation token handed out when a batch request starts.
///
/// A fetched batch is applied only if its ticket is newer than the batch
/// currently shown; older completions are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchTicket(u64);

impl BatchTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Where the exercises of a batch came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOrigin {
    Source,
    /// The source failed; `reason` is what the user should be told.
    Fallback { reason: String },
}

/// Result of trying to install a fetched batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStart {
    Applied {
        ticket: BatchTicket,
        origin: BatchOrigin,
        len: usize,
    },
    /// A newer batch was already applied; this one was discarded.
    Stale { ticket: BatchTicket },
}

impl BatchStart {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// The current batch, the answers typed so far and the lifecycle phase.
///
/// `answers.len() == batch.len()` holds after every batch-defining operation.
#[derive(Default)]
pub struct SessionState {
    batch: Vec<Exercise>,
    answers: AnswerBuffer,
    phase: SessionPhase,
    issued: u64,
    applied: u64,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn batch(&self) -> &[Exercise] {
        &self.batch
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerBuffer {
        &self.answers
    }

    /// Ticket value of the batch currently shown (0 before the first batch).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.applied
    }

    /// "Next" and "repeat" controls are only offered once a batch is graded.
    #[must_use]
    pub fn result_controls_visible(&self) -> bool {
        self.phase == SessionPhase::Graded
    }

    /// Start tracking a new batch request.
    pub fn issue_ticket(&mut self) -> BatchTicket {
        self.issued += 1;
        BatchTicket(self.issued)
    }

    /// Install `exercises` as the current batch unless a newer ticket already won.
    ///
    /// On success answers are reset, the phase becomes `Collecting` and the
    /// result controls are hidden.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Exercise` if `exercises` is empty.
    pub fn apply_batch(
        &mut self,
        ticket: BatchTicket,
        exercises: Vec<Exercise>,
        origin: BatchOrigin,
    ) -> Result<BatchStart, DrillError> {
        if ticket.0 <= self.applied {
            return Ok(BatchStart::Stale { ticket });
        }
        if exercises.is_empty() {
            return Err(ExerciseError::EmptyBatch.into());
        }

        self.answers = AnswerBuffer::unset(exercises.len());
        self.batch = exercises;
        self.phase = SessionPhase::Collecting;
        self.applied = ticket.0;

        Ok(BatchStart::Applied {
            ticket,
            origin,
            len: self.batch.len(),
        })
    }

    /// Store an answer. Ignored when no batch is active or `index` is out of range.
    pub fn record_answer(&mut self, index: usize, value: i64) -> bool {
        if !self.phase.has_batch() {
            return false;
        }
        self.answers.set(index, value)
    }

    /// Grade the current answers and move to `Graded`.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::NoActiveBatch` before the first batch.
    pub fn grade(&mut self) -> Result<ScoreResult, DrillError> {
        if !self.phase.has_batch() || self.batch.is_empty() {
            return Err(DrillError::NoActiveBatch);
        }
        let result = scoring::score(&self.batch, &self.answers);
        self.phase = SessionPhase::Graded;
        Ok(result)
    }

    /// Show the same exercises again with cleared answers.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::NoActiveBatch` before the first batch.
    pub fn repeat_batch(&mut self) -> Result<(), DrillError> {
        if !self.phase.has_batch() {
            return Err(DrillError::NoActiveBatch);
        }
        self.answers.clear();
        self.phase = SessionPhase::Collecting;
        Ok(())
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("batch_len", &self.batch.len())
            .field("answered", &self.answers.answered())
            .field("phase", &self.phase)
            .field("issued", &self.issued)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
