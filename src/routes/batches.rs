use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use vakt_core::RecordStore;

use crate::models::{AckRequest, AckResponse, BatchQuery, BatchResponse, MAX_BATCH};
use crate::state::AppState;

/// Hand-off points for an uploader: take the oldest authorized records,
/// then acknowledge the ones that were transmitted.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/batches", post(next_batch))
        .route("/api/batches/ack", post(ack_batch))
}

/// POST /api/batches?limit=N - Oldest authorized records.
async fn next_batch(State(state): State<AppState>, Query(query): Query<BatchQuery>) -> Response {
    if query.limit == 0 || query.limit > MAX_BATCH {
        return (
            StatusCode::BAD_REQUEST,
            format!("limit must be between 1 and {}", MAX_BATCH),
        )
            .into_response();
    }

    let store = state.authorized.clone();
    match state
        .writer
        .run_exclusive(move || store.read_batch(query.limit))
        .await
    {
        Some(Ok(records)) => Json(BatchResponse { records }).into_response(),
        Some(Err(e)) => {
            tracing::error!("Failed to read batch: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage error").into_response()
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "Writer stopped").into_response(),
    }
}

/// POST /api/batches/ack - Remove transmitted records.
async fn ack_batch(State(state): State<AppState>, Json(req): Json<AckRequest>) -> Response {
    let store = state.authorized.clone();
    match state
        .writer
        .run_exclusive(move || store.remove(&req.keys))
        .await
    {
        Some(Ok(removed)) => Json(AckResponse { removed }).into_response(),
        Some(Err(e)) => {
            tracing::error!("Failed to acknowledge batch: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage error").into_response()
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "Writer stopped").into_response(),
    }
}
