use async_trait::async_trait;
use chrono::{DateTime, Utc};
use drill_core::model::{AchievementProgress, NEWCOMER, Profile, Progress, UserId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Account to be created. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// One saved drill result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub user_id: UserId,
    pub score: u32,
    pub recorded_at: DateTime<Utc>,
}

/// What an achievement write changed beyond the progress itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AchievementUpdate {
    pub leveled_up: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an account together with its profile (level 1, score 0) and the
    /// seeded newcomer achievement.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures. A missing user is `Ok(None)`.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError>;
}

#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Append a result and add its score to the profile total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no profile.
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError>;

    /// Most recent results first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_scores(&self, user_id: UserId, limit: u32)
    -> Result<Vec<ScoreRecord>, StorageError>;
}

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Insert or replace progress for `(user_id, name)`. Reaching 100 raises
    /// the profile level by one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no profile.
    async fn upsert_progress(
        &self,
        user_id: UserId,
        achievement: &AchievementProgress,
    ) -> Result<AchievementUpdate, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user or profile is missing.
    async fn get_profile(&self, user_id: UserId) -> Result<Profile, StorageError>;
}

/// Durable token that remembers the signed-in user across restarts.
#[async_trait]
pub trait IdentityTokenRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_token(&self) -> Result<Option<UserId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_token(&self, user_id: UserId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn clear_token(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    next_user_id: u64,
    users: HashMap<UserId, UserRecord>,
    levels: HashMap<UserId, (u32, u64)>,
    achievements: BTreeMap<(UserId, String), Progress>,
    scores: Vec<ScoreRecord>,
    token: Option<UserId>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserId, StorageError> {
        let mut guard = self.lock()?;
        if guard.users.values().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict);
        }
        guard.next_user_id += 1;
        let id = UserId::new(guard.next_user_id);
        guard.users.insert(
            id,
            UserRecord {
                id,
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                created_at: user.created_at,
            },
        );
        guard.levels.insert(id, (1, 0));
        guard
            .achievements
            .insert((id, NEWCOMER.to_owned()), Progress::ZERO);
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        let (_, total) = guard
            .levels
            .get_mut(&record.user_id)
            .ok_or(StorageError::NotFound)?;
        *total = total.saturating_add(u64::from(record.score));
        guard.scores.push(record.clone());
        i64::try_from(guard.scores.len())
            .map_err(|_| StorageError::Serialization("score id overflow".into()))
    }

    async fn list_scores(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self.lock()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .scores
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AchievementRepository for InMemoryRepository {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        achievement: &AchievementProgress,
    ) -> Result<AchievementUpdate, StorageError> {
        let mut guard = self.lock()?;
        let (level, _) = guard
            .levels
            .get_mut(&user_id)
            .ok_or(StorageError::NotFound)?;
        let leveled_up = achievement.progress.is_complete();
        if leveled_up {
            *level = level.saturating_add(1);
        }
        guard
            .achievements
            .insert((user_id, achievement.name.clone()), achievement.progress);
        Ok(AchievementUpdate { leveled_up })
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Profile, StorageError> {
        let guard = self.lock()?;
        let user = guard.users.get(&user_id).ok_or(StorageError::NotFound)?;
        let (level, total_score) = *guard.levels.get(&user_id).ok_or(StorageError::NotFound)?;
        let achievements = guard
            .achievements
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((_, name), progress)| AchievementProgress {
                name: name.clone(),
                progress: *progress,
            })
            .collect();
        Ok(Profile {
            username: user.username.clone(),
            level,
            total_score,
            achievements,
        })
    }
}

#[async_trait]
impl IdentityTokenRepository for InMemoryRepository {
    async fn load_token(&self) -> Result<Option<UserId>, StorageError> {
        Ok(self.lock()?.token)
    }

    async fn save_token(&self, user_id: UserId) -> Result<(), StorageError> {
        self.lock()?.token = Some(user_id);
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        self.lock()?.token = None;
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub identity_tokens: Arc<dyn IdentityTokenRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    pub(crate) fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + ScoreRepository
            + AchievementRepository
            + ProfileRepository
            + IdentityTokenRepository
            + Clone
            + 'static,
    {
        Self {
            users: Arc::new(repo.clone()),
            scores: Arc::new(repo.clone()),
            achievements: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            identity_tokens: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::PROBLEM_SOLVER;
    use drill_core::time::fixed_now;

    fn new_user(name: &str) -> NewUserRecord {
        NewUserRecord {
            username: name.to_owned(),
            password_hash: "hash".to_owned(),
            created_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn registration_seeds_profile_and_newcomer() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_user(&new_user("ann")).await.unwrap();

        let profile = repo.get_profile(id).await.unwrap();
        assert_eq!(profile.username, "ann");
        assert_eq!(profile.level, 1);
        assert_eq!(profile.total_score, 0);
        assert_eq!(profile.achievement(NEWCOMER).unwrap().progress.value(), 0);

        assert!(matches!(
            repo.insert_user(&new_user("ann")).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn scores_accumulate_and_complete_achievements_level_up() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_user(&new_user("bo")).await.unwrap();

        for score in [3, 4] {
            repo.append_score(&ScoreRecord {
                user_id: id,
                score,
                recorded_at: fixed_now(),
            })
            .await
            .unwrap();
        }

        let partial = AchievementProgress::new(PROBLEM_SOLVER, Progress::new(70).unwrap()).unwrap();
        let update = repo.upsert_progress(id, &partial).await.unwrap();
        assert!(!update.leveled_up);

        let full = AchievementProgress::new(PROBLEM_SOLVER, Progress::COMPLETE).unwrap();
        assert!(repo.upsert_progress(id, &full).await.unwrap().leveled_up);

        let profile = repo.get_profile(id).await.unwrap();
        assert_eq!(profile.total_score, 7);
        assert_eq!(profile.level, 2);
        assert_eq!(profile.achievement(PROBLEM_SOLVER).unwrap().progress, Progress::COMPLETE);

        let recent = repo.list_scores(id, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].score, 4);
    }

    #[tokio::test]
    async fn writes_for_unknown_users_are_not_found() {
        let repo = InMemoryRepository::new();
        let ghost = UserId::new(99);
        let record = ScoreRecord {
            user_id: ghost,
            score: 1,
            recorded_at: fixed_now(),
        };
        assert!(matches!(
            repo.append_score(&record).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.get_profile(ghost).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn identity_token_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_token().await.unwrap(), None);
        repo.save_token(UserId::new(5)).await.unwrap();
        assert_eq!(repo.load_token().await.unwrap(), Some(UserId::new(5)));
        repo.clear_token().await.unwrap();
        assert_eq!(repo.load_token().await.unwrap(), None);
    }
}
