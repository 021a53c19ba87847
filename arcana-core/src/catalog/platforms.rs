use arcana_model::{Platform, PlatformId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{CatalogError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PlatformRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlatformRow> for Platform {
    fn from(row: PlatformRow) -> Self {
        Platform {
            id: PlatformId(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformRepository {
    pool: SqlitePool,
}

impl PlatformRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a platform by name, creating it on first reference.
    ///
    /// Safe against concurrent resolution of the same name: the insert is an
    /// `ON CONFLICT DO NOTHING` upsert, so two racing callers both land on
    /// the single surviving row. Name matching is exact and case-sensitive.
    pub async fn get_or_create(&self, name: &str) -> Result<Platform> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO platforms (name, created_at, updated_at)
             VALUES (?1, ?2, ?2)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, PlatformRow>(
            "SELECT id, name, created_at, updated_at FROM platforms WHERE name = ?1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn get(&self, id: PlatformId) -> Result<Option<Platform>> {
        let row = sqlx::query_as::<_, PlatformRow>(
            "SELECT id, name, created_at, updated_at FROM platforms WHERE id = ?1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Platform::from))
    }

    pub async fn list(&self) -> Result<Vec<Platform>> {
        let rows = sqlx::query_as::<_, PlatformRow>(
            "SELECT id, name, created_at, updated_at FROM platforms ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Platform::from).collect())
    }

    /// Delete a platform. Fails with [`CatalogError::PlatformInUse`] while
    /// any game or API key still references it.
    pub async fn delete(&self, id: PlatformId) -> Result<()> {
        let result = sqlx::query("DELETE FROM platforms WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db)
                    if db.message().contains("FOREIGN KEY") =>
                {
                    CatalogError::PlatformInUse(id.to_string())
                }
                _ => CatalogError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("platform {id}")));
        }
        Ok(())
    }
}
