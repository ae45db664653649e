mod achievement;
mod exercise;
mod identity;
mod ids;
mod profile;
mod session;

pub use achievement::{
    AchievementError, AchievementProgress, NEWCOMER, PROBLEM_SOLVER, Progress,
};
pub use exercise::{
    BatchRequest, DEFAULT_BATCH_SIZE, DEFAULT_MODE, DrillMode, Exercise, ExerciseError,
    OPERAND_MAX, OPERAND_MIN,
};
pub use identity::{Identity, IdentityError};
pub use ids::UserId;
pub use profile::Profile;
pub use session::{AnswerBuffer, ScoreResult, SessionPhase};
