use std::sync::Arc;

use drill_core::Clock;
use drill_core::model::{Identity, ScoreResult};
use storage::repository::{ScoreRecord, ScoreRepository};
use tracing::{debug, info, warn};

/// What happened to a score save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreReport {
    Skipped,
    Saved { id: i64 },
    Failed { error: String },
}

/// Saves the correct-answer count of a graded batch for registered users.
#[derive(Clone)]
pub struct ScoreRecorder {
    clock: Clock,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreRecorder {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { clock, scores }
    }

    /// Best-effort: failures are logged and reported, never returned as errors.
    pub async fn record(&self, identity: &Identity, score: &ScoreResult) -> ScoreReport {
        let Some(user_id) = identity.user_id() else {
            debug!(?identity, "score save skipped");
            return ScoreReport::Skipped;
        };

        let record = ScoreRecord {
            user_id,
            score: u32::try_from(score.correct_count()).unwrap_or(u32::MAX),
            recorded_at: self.clock.now(),
        };

        match self.scores.append_score(&record).await {
            Ok(id) => {
                info!(%user_id, score = record.score, "score saved");
                ScoreReport::Saved { id }
            }
            Err(err) => {
                warn!(%user_id, score = record.score, error = %err, "score save failed");
                ScoreReport::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}
