use std::convert::Infallible;

use arcana_model::{ScanEvent, ScanTaskId, ScanTicket};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub platform: String,
}

/// `POST /api/scans`. Accepts the scan and returns 202 with the task id;
/// everything after acceptance is reported on the event stream.
pub async fn request(
    State(state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> AppResult<impl IntoResponse> {
    let task_id = state.scans.request_scan(&body.platform)?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "task_id": task_id }))))
}

/// `GET /api/scans`. Snapshot of live scans, oldest first.
pub async fn list(State(state): State<AppState>) -> Json<Vec<ScanTicket>> {
    Json(state.scans.active_scans())
}

/// `DELETE /api/scans/{id}`. Advisory cancellation; `cancelled: false` means
/// the task had already reached a terminal state (or never existed).
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<serde_json::Value> {
    let cancelled = state.scans.cancel_scan(ScanTaskId(id));
    Json(json!({ "cancelled": cancelled }))
}

/// `GET /api/scans/events`. Server-sent events merging the progress and
/// completion streams into one tagged feed.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let progress = BroadcastStream::new(state.scans.events().subscribe_progress())
        .filter_map(|event| async move { event.ok() })
        .map(ScanEvent::Progress);
    let complete = BroadcastStream::new(state.scans.events().subscribe_complete())
        .filter_map(|event| async move { event.ok() })
        .map(ScanEvent::Complete);

    let stream = futures::stream::select(progress, complete).map(|event| {
        let payload = Event::default().json_data(&event);
        Ok(match payload {
            Ok(event) => event,
            // Serialization of these types cannot fail in practice; emit a
            // comment frame rather than tearing down the connection.
            Err(_) => Event::default().comment("serialization error"),
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
