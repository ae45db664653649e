use async_trait::async_trait;
use chrono::Utc;
use drill_core::model::UserId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, user_id_from_i64, user_id_to_i64, write_err};
use crate::repository::{IdentityTokenRepository, StorageError};

#[async_trait]
impl IdentityTokenRepository for SqliteRepository {
    async fn load_token(&self) -> Result<Option<UserId>, StorageError> {
        let row = sqlx::query("SELECT user_id FROM identity_token WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| user_id_from_i64(r.try_get::<i64, _>("user_id").map_err(ser)?))
            .transpose()
    }

    async fn save_token(&self, user_id: UserId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO identity_token (id, user_id, saved_at)
                VALUES (1, ?1, ?2)
                ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(user_id_to_i64(user_id)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM identity_token WHERE id = 1")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
