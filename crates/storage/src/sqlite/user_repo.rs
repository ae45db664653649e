use async_trait::async_trait;
use drill_core::model::{NEWCOMER, Progress, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, user_id_from_i64, write_err};
use crate::repository::{NewUserRecord, StorageError, UserRecord, UserRepository};

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO users (username, password_hash, created_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;
        let id = res.last_insert_rowid();

        sqlx::query("INSERT INTO profiles (user_id) VALUES (?1)")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        sqlx::query("INSERT INTO achievements (user_id, name, progress) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(NEWCOMER)
            .bind(i64::from(Progress::ZERO))
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;

        tx.commit().await.map_err(conn)?;
        user_id_from_i64(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, username, password_hash, created_at
                FROM users
                WHERE username = ?1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserRecord {
            id: user_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
            username: row.try_get("username").map_err(ser)?,
            password_hash: row.try_get("password_hash").map_err(ser)?,
            created_at: row.try_get("created_at").map_err(ser)?,
        }))
    }
}
