use serde::{Deserialize, Serialize};

use crate::model::AchievementProgress;

/// Read-only profile snapshot shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub level: u32,
    pub total_score: u64,
    pub achievements: Vec<AchievementProgress>,
}

impl Profile {
    /// Placeholder shown to guests; never read from or written to storage.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            username: "Guest".to_owned(),
            level: 1,
            total_score: 0,
            achievements: Vec::new(),
        }
    }

    #[must_use]
    pub fn achievement(&self, name: &str) -> Option<&AchievementProgress> {
        self.achievements.iter().find(|a| a.name == name)
    }
}
