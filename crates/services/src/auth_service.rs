use std::sync::Arc;

use drill_core::Clock;
use drill_core::model::UserId;
use storage::repository::{NewUserRecord, StorageError, UserRepository};
use tracing::{info, warn};

use crate::error::AuthError;

/// Account registration and password login.
#[derive(Clone)]
pub struct AuthService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    cost: u32,
}

impl AuthService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self {
            clock,
            users,
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost (tests use the minimum of 4).
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Create an account. Does not sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input,
    /// `AuthError::UsernameTaken` for duplicates, or hashing/storage errors.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        let (username, password) = credentials(username, password)?;
        let password_hash = bcrypt::hash(password, self.cost)?;

        let record = NewUserRecord {
            username: username.to_owned(),
            password_hash,
            created_at: self.clock.now(),
        };
        match self.users.insert_user(&record).await {
            Ok(id) => {
                info!(user_id = %id, username, "registered user");
                Ok(id)
            }
            Err(StorageError::Conflict) => {
                warn!(username, "registration with a taken username");
                Err(AuthError::UsernameTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownUser`, `AuthError::WrongPassword`,
    /// `AuthError::MissingCredentials`, or hashing/storage errors.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        let (username, password) = credentials(username, password)?;
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username, "login for unknown user");
            return Err(AuthError::UnknownUser);
        };

        if !bcrypt::verify(password, &user.password_hash)? {
            warn!(username, "wrong password");
            return Err(AuthError::WrongPassword);
        }

        info!(user_id = %user.id, username, "user logged in");
        Ok(user.id)
    }
}

fn credentials<'a>(username: &'a str, password: &'a str) -> Result<(&'a str, &'a str), AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok((username, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> AuthService {
        AuthService::new(fixed_clock(), Arc::new(InMemoryRepository::new())).with_cost(4)
    }

    #[tokio::test]
    async fn register_then_login() {
        let auth = service();
        let id = auth.register(" eve ", "s3cret").await.unwrap();
        assert_eq!(auth.login("eve", "s3cret").await.unwrap(), id);
    }

    #[tokio::test]
    async fn login_failures_are_distinguished() {
        let auth = service();
        auth.register("fay", "pw").await.unwrap();

        assert!(matches!(
            auth.login("fay", "nope").await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            auth.login("gus", "pw").await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            auth.login("fay", "").await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let auth = service();
        auth.register("hal", "pw").await.unwrap();
        assert!(matches!(
            auth.register("hal", "other").await,
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register("  ", "pw").await,
            Err(AuthError::MissingCredentials)
        ));
    }
}
