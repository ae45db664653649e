use std::sync::Arc;

use drill_core::model::{Identity, Profile};
use storage::repository::{ProfileRepository, ScoreRecord, ScoreRepository};

use crate::error::ProfileError;

/// Profile as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileView {
    Registered(Profile),
    /// Placeholder for guests and signed-out users; nothing is stored for them.
    Guest(Profile),
}

impl ProfileView {
    #[must_use]
    pub fn profile(&self) -> &Profile {
        match self {
            Self::Registered(p) | Self::Guest(p) => p,
        }
    }
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { profiles, scores }
    }

    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if a registered user has no profile.
    pub async fn profile(&self, identity: &Identity) -> Result<ProfileView, ProfileError> {
        match identity.user_id() {
            Some(user_id) => Ok(ProfileView::Registered(
                self.profiles.get_profile(user_id).await?,
            )),
            None => Ok(ProfileView::Guest(Profile::guest())),
        }
    }

    /// Latest saved results, newest first. Empty for guests and signed-out users.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Storage` on backend failures.
    pub async fn recent_scores(
        &self,
        identity: &Identity,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, ProfileError> {
        match identity.user_id() {
            Some(user_id) => Ok(self.scores.list_scores(user_id, limit).await?),
            None => Ok(Vec::new()),
        }
    }
}
