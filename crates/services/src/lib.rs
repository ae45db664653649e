#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod drill;
pub mod error;
pub mod exercises;
pub mod identity;
pub mod profile_service;

pub use drill_core::Clock;

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use error::{AppServicesError, AuthError, DrillError, ExerciseSourceError, ProfileError};
pub use exercises::{
    ExerciseSource, ExerciseSourceConfig, FallbackGenerator, HttpExerciseSource,
    TableExerciseSource,
};
pub use identity::IdentityContext;
pub use profile_service::{ProfileService, ProfileView};

pub use drill::{
    AchievementReport, AchievementTracker, BatchOrigin, BatchStart, BatchTicket, DrillLoopService,
    FetchedBatch, GradeOutcome, PersistenceHandles, ScoreRecorder, ScoreReport, SessionState,
};
