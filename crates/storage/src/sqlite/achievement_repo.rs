use async_trait::async_trait;
use drill_core::model::{AchievementProgress, UserId};

use super::SqliteRepository;
use super::mapping::{conn, user_id_to_i64, write_err};
use crate::repository::{AchievementRepository, AchievementUpdate, StorageError};

#[async_trait]
impl AchievementRepository for SqliteRepository {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        achievement: &AchievementProgress,
    ) -> Result<AchievementUpdate, StorageError> {
        let user_id = user_id_to_i64(user_id)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists = sqlx::query("SELECT 1 FROM profiles WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r"
                INSERT INTO achievements (user_id, name, progress)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, name) DO UPDATE SET
                    progress = excluded.progress
            ",
        )
        .bind(user_id)
        .bind(&achievement.name)
        .bind(i64::from(achievement.progress))
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        let leveled_up = achievement.progress.is_complete();
        if leveled_up {
            sqlx::query("UPDATE profiles SET level = level + 1 WHERE user_id = ?1")
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(AchievementUpdate { leveled_up })
    }
}
