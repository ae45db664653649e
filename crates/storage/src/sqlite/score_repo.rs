use async_trait::async_trait;
use drill_core::model::UserId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64, user_id_from_i64, user_id_to_i64, write_err};
use crate::repository::{ScoreRecord, ScoreRepository, StorageError};

#[async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let user_id = user_id_to_i64(record.user_id)?;
        let score = i64::from(record.score);
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let updated = sqlx::query(
            "UPDATE profiles SET total_score = total_score + ?1 WHERE user_id = ?2",
        )
        .bind(score)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;
        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let res = sqlx::query(
            r"
                INSERT INTO results (user_id, score, recorded_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user_id)
        .bind(score)
        .bind(record.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        tx.commit().await.map_err(conn)?;
        Ok(res.last_insert_rowid())
    }

    async fn list_scores(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT user_id, score, recorded_at
                FROM results
                WHERE user_id = ?1
                ORDER BY recorded_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(ScoreRecord {
                user_id: user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
                score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
                recorded_at: row.try_get("recorded_at").map_err(ser)?,
            });
        }
        Ok(out)
    }
}
