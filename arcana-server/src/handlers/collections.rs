use arcana_model::{Collection, CollectionId, CollectionWithGames, GameId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCollection {
    pub name: String,
}

pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Collection>>> {
    Ok(Json(state.catalog.collections().list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCollection>,
) -> AppResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    let collection = state.catalog.collections().create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// Collection plus its member games, titles ascending.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CollectionWithGames>> {
    state
        .catalog
        .collections()
        .get_with_games(CollectionId(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("collection {id}")))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.collections().delete(CollectionId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_game(
    State(state): State<AppState>,
    Path((id, game_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .catalog
        .collections()
        .add_game(CollectionId(id), GameId(game_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_game(
    State(state): State<AppState>,
    Path((id, game_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .catalog
        .collections()
        .remove_game(CollectionId(id), GameId(game_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
