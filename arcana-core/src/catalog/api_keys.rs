use arcana_model::{ApiKey, ApiKeyId, NewApiKey, PlatformId, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::platforms::PlatformRepository;
use super::users::UserRepository;
use crate::{CatalogError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ApiKeyRow {
    id: i64,
    user_id: i64,
    platform_id: i64,
    client_id: Option<String>,
    key: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const API_KEY_COLUMNS: &str =
    "id, user_id, platform_id, client_id, key, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    pool: SqlitePool,
}

impl ApiKeyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn platforms(&self) -> PlatformRepository {
        PlatformRepository::new(self.pool.clone())
    }

    async fn assemble(&self, row: ApiKeyRow) -> Result<ApiKey> {
        let platform = self
            .platforms()
            .get(PlatformId(row.platform_id))
            .await?
            .ok_or_else(|| {
                CatalogError::Internal(format!(
                    "api key {} references missing platform {}",
                    row.id, row.platform_id
                ))
            })?;
        Ok(ApiKey {
            id: ApiKeyId(row.id),
            user_id: UserId(row.user_id),
            platform,
            client_id: row.client_id,
            key: row.key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub async fn create(&self, new: NewApiKey) -> Result<ApiKey> {
        let user = UserRepository::new(self.pool.clone())
            .get_or_create(&new.user)
            .await?;
        let platform = self.platforms().get_or_create(&new.platform).await?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO api_keys (user_id, platform_id, client_id, key, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(user.id.as_i64())
        .bind(platform.id.as_i64())
        .bind(&new.client_id)
        .bind(&new.key)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(ApiKeyId(result.last_insert_rowid()))
            .await?
            .ok_or_else(|| {
                CatalogError::Internal("created api key vanished".into())
            })
    }

    pub async fn get(&self, id: ApiKeyId) -> Result<Option<ApiKey>> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE id = ?1");
        let row = sqlx::query_as::<_, ApiKeyRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    /// List stored keys, optionally scoped to one user, newest first.
    pub async fn list(&self, user: Option<UserId>) -> Result<Vec<ApiKey>> {
        let rows = match user {
            Some(user) => {
                let sql = format!(
                    "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE user_id = ?1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ApiKeyRow>(&sql)
                    .bind(user.as_i64())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, ApiKeyRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(self.assemble(row).await?);
        }
        Ok(keys)
    }

    /// First stored key for the named platform, if any. Used by scanner
    /// prerequisite checks.
    pub async fn find_for_platform(&self, platform: &str) -> Result<Option<ApiKey>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            "SELECT k.id, k.user_id, k.platform_id, k.client_id, k.key, \
             k.created_at, k.updated_at
             FROM api_keys k
             INNER JOIN platforms p ON p.id = k.platform_id
             WHERE p.name = ?1
             ORDER BY k.created_at DESC
             LIMIT 1",
        )
            .bind(platform)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    /// Update key material and/or client id; `None` keeps the stored value.
    pub async fn update(
        &self,
        id: ApiKeyId,
        key: Option<String>,
        client_id: Option<String>,
    ) -> Result<ApiKey> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE api_keys SET
                key = COALESCE(?1, key),
                client_id = COALESCE(?2, client_id),
                updated_at = ?3
             WHERE id = ?4",
        )
        .bind(key)
        .bind(client_id)
        .bind(now)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("api key {id}")));
        }
        self.get(id).await?.ok_or_else(|| {
            CatalogError::Internal(format!("updated api key {id} vanished"))
        })
    }

    pub async fn delete(&self, id: ApiKeyId) -> Result<()> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("api key {id}")));
        }
        Ok(())
    }
}
