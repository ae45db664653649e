use std::sync::Arc;

use storage::repository::{IdentityTokenRepository, Storage};
use tracing::info;

use crate::Clock;
use crate::auth_service::AuthService;
use crate::drill::{AchievementTracker, DrillLoopService, ScoreRecorder};
use crate::error::AppServicesError;
use crate::exercises::{ExerciseSource, ExerciseSourceConfig, HttpExerciseSource, TableExerciseSource};
use crate::identity::IdentityContext;
use crate::profile_service::ProfileService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    drill: Arc<DrillLoopService>,
    auth: Arc<AuthService>,
    profiles: Arc<ProfileService>,
    identity_tokens: Arc<dyn IdentityTokenRepository>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Uses the HTTP exercise source when `source` is given, the local table
    /// generator otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the HTTP client fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        source: Option<ExerciseSourceConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let source: Arc<dyn ExerciseSource> = match source {
            Some(config) => {
                info!(base_url = %config.base_url, "using remote exercise source");
                Arc::new(HttpExerciseSource::new(config)?)
            }
            None => Arc::new(TableExerciseSource),
        };
        Ok(Self::from_storage(&storage, clock, source))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, source: Arc<dyn ExerciseSource>) -> Self {
        let drill = Arc::new(DrillLoopService::new(
            source,
            ScoreRecorder::new(clock, Arc::clone(&storage.scores)),
            AchievementTracker::new(Arc::clone(&storage.achievements)),
        ));
        let auth = Arc::new(AuthService::new(clock, Arc::clone(&storage.users)));
        let profiles = Arc::new(ProfileService::new(
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.scores),
        ));

        Self {
            drill,
            auth,
            profiles,
            identity_tokens: Arc::clone(&storage.identity_tokens),
        }
    }

    /// Rebuild the auth service with another bcrypt cost.
    #[must_use]
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.auth = Arc::new(AuthService::clone(&self.auth).with_cost(cost));
        self
    }

    /// Identity for a fresh process, restored from the saved token if any.
    pub async fn restore_identity(&self) -> IdentityContext {
        IdentityContext::restore(Arc::clone(&self.identity_tokens)).await
    }

    #[must_use]
    pub fn drill(&self) -> Arc<DrillLoopService> {
        Arc::clone(&self.drill)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }
}
