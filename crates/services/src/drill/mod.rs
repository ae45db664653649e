mod achievements;
mod scores;
mod state;
mod workflow;

// Public API of the drill subsystem.
pub use crate::error::DrillError;
pub use achievements::{AchievementReport, AchievementTracker};
pub use scores::{ScoreRecorder, ScoreReport};
pub use state::{BatchOrigin, BatchStart, BatchTicket, SessionState};
pub use workflow::{DrillLoopService, FetchedBatch, GradeOutcome, PersistenceHandles};
