use arcana_model::{User, UserId};
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
pub struct CreateUser {
    pub name: String,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.catalog.users().list().await?))
}

/// Get-or-create by name; creating an existing user returns the stored row.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    let user = state.catalog.users().get_or_create(&body.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.users().delete(UserId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn active(State(state): State<AppState>) -> AppResult<Json<User>> {
    state
        .catalog
        .users()
        .get_active()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("no active user"))
}

pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.users().set_active(UserId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
