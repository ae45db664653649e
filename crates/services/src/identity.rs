use std::sync::Arc;

use drill_core::model::{Identity, IdentityError, UserId};
use storage::repository::IdentityTokenRepository;
use tracing::{info, warn};

/// Owns the acting identity and keeps the durable sign-in token in step with it.
///
/// Token reads and writes are best-effort: a storage failure is logged and the
/// in-memory identity still changes.
#[derive(Clone)]
pub struct IdentityContext {
    identity: Identity,
    tokens: Arc<dyn IdentityTokenRepository>,
}

impl IdentityContext {
    #[must_use]
    pub fn new(tokens: Arc<dyn IdentityTokenRepository>) -> Self {
        Self {
            identity: Identity::Unauthenticated,
            tokens,
        }
    }

    /// Start as `Registered(id)` when a token was saved by an earlier run.
    pub async fn restore(tokens: Arc<dyn IdentityTokenRepository>) -> Self {
        let identity = match tokens.load_token().await {
            Ok(Some(user_id)) => {
                info!(%user_id, "restored signed-in user");
                Identity::Registered(user_id)
            }
            Ok(None) => Identity::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "could not read identity token");
                Identity::Unauthenticated
            }
        };
        Self { identity, tokens }
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Must hold before an account is created or checked.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AlreadySignedIn` for guests and registered users.
    pub fn ensure_signed_out(&self) -> Result<(), IdentityError> {
        if self.identity.is_signed_in() {
            return Err(IdentityError::AlreadySignedIn {
                current: self.identity,
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `IdentityError::AlreadySignedIn` unless currently unauthenticated.
    pub async fn sign_in(&mut self, user_id: UserId) -> Result<Identity, IdentityError> {
        self.identity = self.identity.register(user_id)?;
        if let Err(err) = self.tokens.save_token(user_id).await {
            warn!(%user_id, error = %err, "could not persist identity token");
        }
        info!(%user_id, "signed in");
        Ok(self.identity)
    }

    /// # Errors
    ///
    /// Returns `IdentityError::AlreadySignedIn` unless currently unauthenticated.
    pub fn continue_as_guest(&mut self) -> Result<Identity, IdentityError> {
        self.identity = self.identity.guest()?;
        info!("continuing as guest");
        Ok(self.identity)
    }

    /// # Errors
    ///
    /// Returns `IdentityError::NotSignedIn` when already unauthenticated.
    pub async fn logout(&mut self) -> Result<Identity, IdentityError> {
        self.identity = self.identity.logout()?;
        if let Err(err) = self.tokens.clear_token().await {
            warn!(error = %err, "could not clear identity token");
        }
        info!("signed out");
        Ok(self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn restores_registered_identity_from_token() {
        let repo = InMemoryRepository::new();
        repo.save_token(UserId::new(12)).await.unwrap();

        let ctx = IdentityContext::restore(Arc::new(repo)).await;

        assert_eq!(ctx.identity(), Identity::Registered(UserId::new(12)));
    }

    #[tokio::test]
    async fn sign_in_and_logout_manage_the_token() {
        let repo = InMemoryRepository::new();
        let mut ctx = IdentityContext::restore(Arc::new(repo.clone())).await;
        assert_eq!(ctx.identity(), Identity::Unauthenticated);

        ctx.sign_in(UserId::new(3)).await.unwrap();
        assert_eq!(repo.load_token().await.unwrap(), Some(UserId::new(3)));
        assert!(ctx.continue_as_guest().is_err());

        ctx.logout().await.unwrap();
        assert_eq!(repo.load_token().await.unwrap(), None);
        assert_eq!(ctx.identity(), Identity::Unauthenticated);
    }

    #[tokio::test]
    async fn guest_never_writes_a_token() {
        let repo = InMemoryRepository::new();
        let mut ctx = IdentityContext::new(Arc::new(repo.clone()));

        assert_eq!(ctx.continue_as_guest().unwrap(), Identity::Guest);
        assert_eq!(repo.load_token().await.unwrap(), None);
        assert!(!ctx.identity().persists_progress());
    }

    #[tokio::test]
    async fn only_signed_out_context_may_authenticate() {
        let mut ctx = IdentityContext::new(Arc::new(InMemoryRepository::new()));
        assert!(ctx.ensure_signed_out().is_ok());

        ctx.continue_as_guest().unwrap();
        assert_eq!(
            ctx.ensure_signed_out().unwrap_err(),
            IdentityError::AlreadySignedIn {
                current: Identity::Guest
            }
        );

        ctx.logout().await.unwrap();
        ctx.sign_in(UserId::new(4)).await.unwrap();
        assert!(ctx.ensure_signed_out().is_err());
    }
}
