use std::sync::Arc;

use drill_core::model::{BatchRequest, Exercise, Identity, ScoreResult};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::achievements::{AchievementReport, AchievementTracker};
use super::scores::{ScoreRecorder, ScoreReport};
use super::state::{BatchOrigin, BatchStart, BatchTicket, SessionState};
use crate::error::{DrillError, ExerciseSourceError};
use crate::exercises::{ExerciseSource, FallbackGenerator};

/// A batch ready to be applied, always of the requested length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBatch {
    pub exercises: Vec<Exercise>,
    pub origin: BatchOrigin,
}

/// Background persistence started by a grading. Dropping it does not cancel the writes.
#[derive(Debug)]
pub struct PersistenceHandles {
    pub score: JoinHandle<ScoreReport>,
    pub achievement: JoinHandle<AchievementReport>,
}

impl PersistenceHandles {
    /// Wait for both writes to finish.
    pub async fn join(self) -> (ScoreReport, AchievementReport) {
        let score = self.score.await.unwrap_or_else(|err| ScoreReport::Failed {
            error: err.to_string(),
        });
        let achievement = self
            .achievement
            .await
            .unwrap_or_else(|err| AchievementReport::Failed {
                progress: None,
                error: err.to_string(),
            });
        (score, achievement)
    }
}

/// Result of checking a batch: the score, plus persistence for registered users.
#[derive(Debug)]
pub struct GradeOutcome {
    pub score: ScoreResult,
    pub persistence: Option<PersistenceHandles>,
}

/// Orchestrates batch generation, grading and result persistence.
#[derive(Clone)]
pub struct DrillLoopService {
    source: Arc<dyn ExerciseSource>,
    fallback: FallbackGenerator,
    scores: ScoreRecorder,
    achievements: AchievementTracker,
}

impl DrillLoopService {
    #[must_use]
    pub fn new(
        source: Arc<dyn ExerciseSource>,
        scores: ScoreRecorder,
        achievements: AchievementTracker,
    ) -> Self {
        Self {
            source,
            fallback: FallbackGenerator,
            scores,
            achievements,
        }
    }

    /// Ask the source for a batch, substituting a local one on any failure.
    pub async fn fetch_batch(&self, request: &BatchRequest) -> FetchedBatch {
        let generated = self
            .source
            .generate(request)
            .await
            .and_then(|batch| check_len(batch, request.count()));

        match generated {
            Ok(exercises) => FetchedBatch {
                exercises,
                origin: BatchOrigin::Source,
            },
            Err(err) => {
                warn!(
                    mode = %request.mode(),
                    count = request.count(),
                    error = %err,
                    "exercise generation failed; using local fallback"
                );
                FetchedBatch {
                    exercises: self.fallback.generate(request.count()),
                    origin: BatchOrigin::Fallback {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    /// Install a fetched batch if `ticket` is still the newest one.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if the batch is empty.
    pub fn apply(
        &self,
        state: &mut SessionState,
        ticket: BatchTicket,
        fetched: FetchedBatch,
    ) -> Result<BatchStart, DrillError> {
        let start = state.apply_batch(ticket, fetched.exercises, fetched.origin)?;
        if let BatchStart::Stale { ticket } = &start {
            debug!(
                ticket = ticket.value(),
                current = state.generation(),
                "dropping stale batch"
            );
        }
        Ok(start)
    }

    /// Request, fetch and install a new batch.
    ///
    /// Callers that keep several requests in flight use `SessionState::issue_ticket`,
    /// `fetch_batch` and `apply` directly.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if the batch is empty.
    pub async fn start_batch(
        &self,
        state: &mut SessionState,
        request: &BatchRequest,
    ) -> Result<BatchStart, DrillError> {
        let ticket = state.issue_ticket();
        let fetched = self.fetch_batch(request).await;
        self.apply(state, ticket, fetched)
    }

    /// Advance to a fresh batch after grading.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if the batch is empty.
    pub async fn next_batch(
        &self,
        state: &mut SessionState,
        request: &BatchRequest,
    ) -> Result<BatchStart, DrillError> {
        self.start_batch(state, request).await
    }

    /// Grade the current batch and start persisting the result.
    ///
    /// The score is returned immediately; persistence runs on the Tokio runtime
    /// and its outcome never changes the session.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::NoActiveBatch` when there is nothing to grade.
    pub fn grade(
        &self,
        state: &mut SessionState,
        identity: &Identity,
    ) -> Result<GradeOutcome, DrillError> {
        let score = state.grade()?;
        let persistence = self.dispatch_persistence(*identity, &score);
        Ok(GradeOutcome { score, persistence })
    }

    /// Spawn the score save and the achievement update as independent tasks.
    ///
    /// Returns `None` without touching storage unless `identity` is registered.
    pub fn dispatch_persistence(
        &self,
        identity: Identity,
        score: &ScoreResult,
    ) -> Option<PersistenceHandles> {
        if !identity.persists_progress() {
            debug!(?identity, "result not persisted");
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available; result not persisted");
            return None;
        };

        let scores = self.scores.clone();
        let score_result = score.clone();
        let score_task =
            runtime.spawn(async move { scores.record(&identity, &score_result).await });

        let achievements = self.achievements.clone();
        let score_result = score.clone();
        let achievement_task = runtime
            .spawn(async move { achievements.report_score(&identity, &score_result).await });

        Some(PersistenceHandles {
            score: score_task,
            achievement: achievement_task,
        })
    }
}

fn check_len(batch: Vec<Exercise>, expected: usize) -> Result<Vec<Exercise>, ExerciseSourceError> {
    if batch.len() == expected {
        Ok(batch)
    } else {
        Err(ExerciseSourceError::Malformed(format!(
            "expected {expected} exercises, got {}",
            batch.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_is_malformed() {
        let one = vec![Exercise::new(2, 2).unwrap()];
        assert!(check_len(one.clone(), 1).is_ok());
        assert!(matches!(
            check_len(one, 3),
            Err(ExerciseSourceError::Malformed(_))
        ));
    }
}
