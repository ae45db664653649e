use async_trait::async_trait;
use drill_core::model::{AchievementProgress, Profile, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, progress_from_i64, ser, u32_from_i64, u64_from_i64, user_id_to_i64};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self, user_id: UserId) -> Result<Profile, StorageError> {
        let user_id = user_id_to_i64(user_id)?;

        let row = sqlx::query(
            r"
                SELECT u.username, p.level, p.total_score
                FROM profiles p
                JOIN users u ON p.user_id = u.id
                WHERE p.user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let rows = sqlx::query(
            r"
                SELECT name, progress
                FROM achievements
                WHERE user_id = ?1
                ORDER BY name ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut achievements = Vec::with_capacity(rows.len());
        for a in rows {
            achievements.push(AchievementProgress {
                name: a.try_get("name").map_err(ser)?,
                progress: progress_from_i64(a.try_get::<i64, _>("progress").map_err(ser)?)?,
            });
        }

        Ok(Profile {
            username: row.try_get("username").map_err(ser)?,
            level: u32_from_i64("level", row.try_get::<i64, _>("level").map_err(ser)?)?,
            total_score: u64_from_i64(
                "total_score",
                row.try_get::<i64, _>("total_score").map_err(ser)?,
            )?,
            achievements,
        })
    }
}
