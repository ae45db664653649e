use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("already signed in as {current:?}; log out first")]
    AlreadySignedIn { current: Identity },

    #[error("not signed in")]
    NotSignedIn,
}

/// Who is acting. Only `Registered` identities have their results persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Identity {
    #[default]
    Unauthenticated,
    Guest,
    Registered(UserId),
}

impl Identity {
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Registered(id) => Some(*id),
            Self::Unauthenticated | Self::Guest => None,
        }
    }

    /// Whether score and achievement writes should be attempted.
    #[must_use]
    pub fn persists_progress(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    /// `Unauthenticated -> Registered(id)`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AlreadySignedIn` from any other state.
    pub fn register(self, id: UserId) -> Result<Self, IdentityError> {
        self.leave_unauthenticated(Self::Registered(id))
    }

    /// `Unauthenticated -> Guest`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::AlreadySignedIn` from any other state.
    pub fn guest(self) -> Result<Self, IdentityError> {
        self.leave_unauthenticated(Self::Guest)
    }

    /// `Guest | Registered -> Unauthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::NotSignedIn` when already unauthenticated.
    pub fn logout(self) -> Result<Self, IdentityError> {
        match self {
            Self::Unauthenticated => Err(IdentityError::NotSignedIn),
            Self::Guest | Self::Registered(_) => Ok(Self::Unauthenticated),
        }
    }

    fn leave_unauthenticated(self, next: Self) -> Result<Self, IdentityError> {
        match self {
            Self::Unauthenticated => Ok(next),
            current => Err(IdentityError::AlreadySignedIn { current }),
        }
    }
}
