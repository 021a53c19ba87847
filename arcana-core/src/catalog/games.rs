use arcana_model::{Game, GameId, GamePatch, NewGame, Platform, PlatformId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::platforms::PlatformRepository;
use crate::{CatalogError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct GameRow {
    pub id: i64,
    pub appid: Option<i64>,
    pub title: String,
    pub platform_id: i64,
    pub genre: String,
    pub tags: Option<String>,
    pub release_date: Option<String>,
    pub playtime_minutes: Option<i64>,
    pub installed_path: Option<String>,
    pub application_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const GAME_COLUMNS: &str = "id, appid, title, platform_id, genre, tags, \
     release_date, playtime_minutes, installed_path, application_file, \
     created_at, updated_at";

fn decode_tags(raw: Option<&str>) -> Result<Vec<String>> {
    match raw {
        Some(text) if !text.is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone)]
pub struct GameRepository {
    pool: SqlitePool,
}

impl GameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn platforms(&self) -> PlatformRepository {
        PlatformRepository::new(self.pool.clone())
    }

    async fn assemble(&self, row: GameRow) -> Result<Game> {
        let platform = self
            .platforms()
            .get(PlatformId(row.platform_id))
            .await?
            .ok_or_else(|| {
                CatalogError::Internal(format!(
                    "game {} references missing platform {}",
                    row.id, row.platform_id
                ))
            })?;
        Ok(Game {
            id: GameId(row.id),
            appid: row.appid,
            title: row.title,
            platform,
            genre: row.genre,
            tags: decode_tags(row.tags.as_deref())?,
            release_date: row.release_date,
            playtime_minutes: row.playtime_minutes,
            installed_path: row.installed_path,
            application_file: row.application_file,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Insert a game, resolving (or creating) its platform by name. The
    /// genre defaults to `"Unknown"` when the payload omits one; a duplicate
    /// (title, platform) pair is rejected by the unique constraint.
    pub async fn insert(&self, new: NewGame) -> Result<Game> {
        let platform = self.platforms().get_or_create(&new.platform).await?;
        self.insert_for_platform(new, &platform).await
    }

    /// Insert variant for callers that already resolved the platform row.
    pub async fn insert_for_platform(
        &self,
        new: NewGame,
        platform: &Platform,
    ) -> Result<Game> {
        let tags = serde_json::to_string(&new.tags)?;
        let genre = new.genre.unwrap_or_else(|| "Unknown".to_string());
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO games (appid, title, platform_id, genre, tags, \
             release_date, playtime_minutes, installed_path, \
             application_file, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        )
        .bind(new.appid)
        .bind(&new.title)
        .bind(platform.id.as_i64())
        .bind(&genre)
        .bind(&tags)
        .bind(&new.release_date)
        .bind(new.playtime_minutes)
        .bind(&new.installed_path)
        .bind(&new.application_file)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = GameId(result.last_insert_rowid());
        self.get(id).await?.ok_or_else(|| {
            CatalogError::Internal(format!("inserted game {id} vanished"))
        })
    }

    /// Dedupe pre-check: is there already a game with this exact title on
    /// this platform? The (title, platform) pair is the documented dedupe
    /// key for ingestion.
    pub async fn exists(
        &self,
        title: &str,
        platform_id: PlatformId,
    ) -> Result<bool> {
        let present: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM games WHERE title = ?1 AND platform_id = ?2)",
        )
        .bind(title)
        .bind(platform_id.as_i64())
        .fetch_one(&self.pool)
        .await?;
        Ok(present != 0)
    }

    pub async fn get(&self, id: GameId) -> Result<Option<Game>> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1");
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<Game>> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY title ASC");
        let rows = sqlx::query_as::<_, GameRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        let mut games = Vec::with_capacity(rows.len());
        for row in rows {
            games.push(self.assemble(row).await?);
        }
        Ok(games)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Apply a partial update; `None` fields keep their stored value.
    pub async fn update(&self, id: GameId, patch: GamePatch) -> Result<Game> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("game {id}")))?;

        let platform = match patch.platform {
            Some(name) => self.platforms().get_or_create(&name).await?,
            None => existing.platform,
        };
        let tags =
            serde_json::to_string(&patch.tags.unwrap_or(existing.tags))?;
        let now = Utc::now();

        sqlx::query(
            "UPDATE games SET
                appid = ?1,
                title = ?2,
                platform_id = ?3,
                genre = ?4,
                tags = ?5,
                release_date = ?6,
                playtime_minutes = ?7,
                installed_path = ?8,
                application_file = ?9,
                updated_at = ?10
             WHERE id = ?11",
        )
        .bind(patch.appid.or(existing.appid))
        .bind(patch.title.unwrap_or(existing.title))
        .bind(platform.id.as_i64())
        .bind(patch.genre.unwrap_or(existing.genre))
        .bind(&tags)
        .bind(patch.release_date.or(existing.release_date))
        .bind(patch.playtime_minutes.or(existing.playtime_minutes))
        .bind(patch.installed_path.or(existing.installed_path))
        .bind(patch.application_file.or(existing.application_file))
        .bind(now)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        self.get(id).await?.ok_or_else(|| {
            CatalogError::Internal(format!("updated game {id} vanished"))
        })
    }

    pub async fn delete(&self, id: GameId) -> Result<()> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("game {id}")));
        }
        Ok(())
    }

    pub async fn list_distinct_genres(&self) -> Result<Vec<String>> {
        let genres: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT genre FROM games ORDER BY genre",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(genres.into_iter().map(|(g,)| g).collect())
    }
}
