//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::ExerciseError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Why an exercise source could not deliver a batch.
///
/// Never surfaced past `DrillLoopService`: any of these triggers the local fallback.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExerciseSourceError {
    #[error("unknown drill mode: {0}")]
    UnknownMode(String),
    #[error("exercise source returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed batch: {0}")]
    Malformed(String),
    #[error("exercise source unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by the drill session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DrillError {
    #[error("no active batch to grade")]
    NoActiveBatch,
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
}

/// Errors emitted by `AuthService`. Shown to the user as-is.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("user not found")]
    UnknownUser,
    #[error("wrong password")]
    WrongPassword,
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ProfileError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Source(#[from] ExerciseSourceError),
}
