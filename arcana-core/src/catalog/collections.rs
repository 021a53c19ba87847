use arcana_model::{
    Collection, CollectionId, CollectionWithGames, GameId,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::games::GameRepository;
use crate::{CatalogError, Result};

#[derive(Debug, Clone, sqlx::FromRow)]
struct CollectionRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: CollectionId(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: SqlitePool,
}

impl CollectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str) -> Result<Collection> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO collections (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        )
        .bind(name)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(CollectionId(result.last_insert_rowid()))
            .await?
            .ok_or_else(|| {
                CatalogError::Internal("created collection vanished".into())
            })
    }

    pub async fn get(&self, id: CollectionId) -> Result<Option<Collection>> {
        let row = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, name, created_at, updated_at FROM collections WHERE id = ?1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Collection::from))
    }

    pub async fn list(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            "SELECT id, name, created_at, updated_at FROM collections ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Collection::from).collect())
    }

    pub async fn get_with_games(
        &self,
        id: CollectionId,
    ) -> Result<Option<CollectionWithGames>> {
        let Some(collection) = self.get(id).await? else {
            return Ok(None);
        };

        let game_ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT g.id FROM games g
             INNER JOIN collection_games cg ON cg.game_id = g.id
             WHERE cg.collection_id = ?1
             ORDER BY g.title",
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let games_repo = GameRepository::new(self.pool.clone());
        let mut games = Vec::with_capacity(game_ids.len());
        for (game_id,) in game_ids {
            if let Some(game) = games_repo.get(GameId(game_id)).await? {
                games.push(game);
            }
        }

        Ok(Some(CollectionWithGames { collection, games }))
    }

    /// Membership insert; already-present pairs are ignored.
    pub async fn add_game(
        &self,
        collection: CollectionId,
        game: GameId,
    ) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO collection_games (collection_id, game_id) VALUES (?1, ?2)",
        )
        .bind(collection.as_i64())
        .bind(game.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_game(
        &self,
        collection: CollectionId,
        game: GameId,
    ) -> Result<()> {
        sqlx::query(
            "DELETE FROM collection_games WHERE collection_id = ?1 AND game_id = ?2",
        )
        .bind(collection.as_i64())
        .bind(game.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: CollectionId) -> Result<()> {
        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("collection {id}")));
        }
        Ok(())
    }
}
