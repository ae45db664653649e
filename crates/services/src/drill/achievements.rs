use std::sync::Arc;

use drill_core::model::{AchievementProgress, Identity, PROBLEM_SOLVER, Progress, ScoreResult};
use storage::repository::AchievementRepository;
use tracing::{debug, info, warn};

/// What happened to an achievement report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementReport {
    /// Identity is not registered; nothing was written.
    Skipped,
    Saved {
        progress: Progress,
        leveled_up: bool,
    },
    Failed {
        progress: Option<Progress>,
        error: String,
    },
}

/// Turns a graded batch into "Problem Solver" progress for registered users.
///
/// Progress reflects the latest batch only; earlier sessions are not accumulated.
#[derive(Clone)]
pub struct AchievementTracker {
    achievements: Arc<dyn AchievementRepository>,
}

impl AchievementTracker {
    #[must_use]
    pub fn new(achievements: Arc<dyn AchievementRepository>) -> Self {
        Self { achievements }
    }

    /// Best-effort: failures are logged and reported, never returned as errors.
    pub async fn report_score(&self, identity: &Identity, score: &ScoreResult) -> AchievementReport {
        let Some(user_id) = identity.user_id() else {
            debug!(?identity, "achievement report skipped");
            return AchievementReport::Skipped;
        };

        let progress = match Progress::from_score(score) {
            Ok(progress) => progress,
            Err(err) => {
                warn!(%user_id, error = %err, "cannot derive achievement progress");
                return AchievementReport::Failed {
                    progress: None,
                    error: err.to_string(),
                };
            }
        };

        let achievement = AchievementProgress {
            name: PROBLEM_SOLVER.to_owned(),
            progress,
        };

        match self.achievements.upsert_progress(user_id, &achievement).await {
            Ok(update) => {
                info!(%user_id, %progress, leveled_up = update.leveled_up, "achievement updated");
                AchievementReport::Saved {
                    progress,
                    leveled_up: update.leveled_up,
                }
            }
            Err(err) => {
                warn!(%user_id, %progress, error = %err, "achievement update failed");
                AchievementReport::Failed {
                    progress: Some(progress),
                    error: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::UserId;
    use drill_core::time::fixed_now;
    use storage::repository::{
        InMemoryRepository, NewUserRecord, ProfileRepository, UserRepository,
    };

    fn score(correct: usize, total: usize) -> ScoreResult {
        ScoreResult::from_outcomes((0..total).map(|i| i < correct).collect())
    }

    async fn registered(repo: &InMemoryRepository) -> UserId {
        repo.insert_user(&NewUserRecord {
            username: "dee".into(),
            password_hash: "x".into(),
            created_at: fixed_now(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn registered_user_progress_is_saved() {
        let repo = InMemoryRepository::new();
        let id = registered(&repo).await;
        let tracker = AchievementTracker::new(Arc::new(repo.clone()));

        let report = tracker
            .report_score(&Identity::Registered(id), &score(7, 10))
            .await;

        assert_eq!(
            report,
            AchievementReport::Saved {
                progress: Progress::new(70).unwrap(),
                leveled_up: false,
            }
        );
        let profile = repo.get_profile(id).await.unwrap();
        assert_eq!(
            profile.achievement(PROBLEM_SOLVER).unwrap().progress.value(),
            70
        );
    }

    #[tokio::test]
    async fn perfect_score_levels_up() {
        let repo = InMemoryRepository::new();
        let id = registered(&repo).await;
        let tracker = AchievementTracker::new(Arc::new(repo.clone()));

        let report = tracker
            .report_score(&Identity::Registered(id), &score(10, 10))
            .await;

        assert!(matches!(
            report,
            AchievementReport::Saved {
                leveled_up: true,
                ..
            }
        ));
        assert_eq!(repo.get_profile(id).await.unwrap().level, 2);
    }

    #[tokio::test]
    async fn storage_failure_is_reported_not_raised() {
        let repo = InMemoryRepository::new();
        let tracker = AchievementTracker::new(Arc::new(repo));

        let report = tracker
            .report_score(&Identity::Registered(UserId::new(77)), &score(0, 5))
            .await;

        assert!(matches!(
            report,
            AchievementReport::Failed {
                progress: Some(p),
                ..
            } if p == Progress::ZERO
        ));
    }

    #[tokio::test]
    async fn non_registered_identities_are_skipped() {
        let repo = InMemoryRepository::new();
        let id = registered(&repo).await;
        let tracker = AchievementTracker::new(Arc::new(repo.clone()));

        for identity in [Identity::Guest, Identity::Unauthenticated] {
            let report = tracker.report_score(&identity, &score(10, 10)).await;
            assert_eq!(report, AchievementReport::Skipped);
        }

        let profile = repo.get_profile(id).await.unwrap();
        assert!(profile.achievement(PROBLEM_SOLVER).is_none());
        assert_eq!(profile.level, 1);
    }
}
