use arcana_model::{User, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{CatalogError, Result};

const ACTIVE_USER_KEY: &str = "active_user_id";

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a user by name, creating one on first reference. Same upsert
    /// shape as platform resolution.
    pub async fn get_or_create(&self, name: &str) -> Result<User> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (name, created_at, updated_at)
             VALUES (?1, ?2, ?2)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn get(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn delete(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    pub async fn set_active(&self, id: UserId) -> Result<()> {
        sqlx::query(
            "INSERT INTO _meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(ACTIVE_USER_KEY)
        .bind(id.as_i64().to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_active(&self) -> Result<Option<User>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM _meta WHERE key = ?1")
                .bind(ACTIVE_USER_KEY)
                .fetch_optional(&self.pool)
                .await?;
        let Some((raw,)) = value else {
            return Ok(None);
        };
        let id = raw.parse::<i64>().map_err(|_| {
            CatalogError::Internal(format!("corrupt {ACTIVE_USER_KEY}: {raw}"))
        })?;
        self.get(UserId(id)).await
    }
}
