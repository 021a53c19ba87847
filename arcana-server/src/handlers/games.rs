use arcana_model::{Game, GameId, GamePatch, NewGame};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Game>>> {
    Ok(Json(state.catalog.games().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Game>> {
    state
        .catalog
        .games()
        .get(GameId(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("game {id}")))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewGame>,
) -> AppResult<impl IntoResponse> {
    if new.title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    let game = state.catalog.games().insert(new).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<GamePatch>,
) -> AppResult<Json<Game>> {
    Ok(Json(state.catalog.games().update(GameId(id), patch).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.games().delete(GameId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Distinct genres across the catalog, sorted.
pub async fn genres(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.games().list_distinct_genres().await?))
}
