use arcana_model::{Platform, PlatformId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::errors::AppResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Platform>>> {
    Ok(Json(state.catalog.platforms().list().await?))
}

/// Deletion is refused with 409 while any game or API key references the
/// platform.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.platforms().delete(PlatformId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
