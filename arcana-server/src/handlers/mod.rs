use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

pub mod api_keys;
pub mod collections;
pub mod games;
pub mod platforms;
pub mod scans;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Scan engine
        .route("/api/scans", post(scans::request).get(scans::list))
        .route("/api/scans/events", get(scans::events))
        .route("/api/scans/{id}", delete(scans::cancel))
        // Catalog
        .route("/api/games", get(games::list).post(games::create))
        .route(
            "/api/games/{id}",
            get(games::get).put(games::update).delete(games::remove),
        )
        .route("/api/genres", get(games::genres))
        .route("/api/platforms", get(platforms::list))
        .route("/api/platforms/{id}", delete(platforms::remove))
        .route(
            "/api/collections",
            get(collections::list).post(collections::create),
        )
        .route(
            "/api/collections/{id}",
            get(collections::get).delete(collections::remove),
        )
        .route(
            "/api/collections/{id}/games/{game_id}",
            put(collections::add_game).delete(collections::remove_game),
        )
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/{id}", delete(users::remove))
        .route("/api/users/active", get(users::active))
        .route("/api/users/{id}/activate", post(users::activate))
        .route("/api/keys", get(api_keys::list).post(api_keys::create))
        .route(
            "/api/keys/{id}",
            put(api_keys::update).delete(api_keys::remove),
        )
        .with_state(state)
}
