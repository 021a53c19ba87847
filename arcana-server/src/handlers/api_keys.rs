use arcana_model::{ApiKey, ApiKeyId, NewApiKey, UserId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyPatch {
    pub key: Option<String>,
    pub client_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ApiKey>>> {
    let keys = state
        .catalog
        .api_keys()
        .list(query.user_id.map(UserId))
        .await?;
    Ok(Json(keys))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewApiKey>,
) -> AppResult<impl IntoResponse> {
    let key = state.catalog.api_keys().create(new).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ApiKeyPatch>,
) -> AppResult<Json<ApiKey>> {
    let key = state
        .catalog
        .api_keys()
        .update(ApiKeyId(id), patch.key, patch.client_id)
        .await?;
    Ok(Json(key))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.api_keys().delete(ApiKeyId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
