use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use vakt_core::{RecordStore, StorageArea};

use crate::models::RecordsResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/records", post(create_record))
        .route("/api/records/{area}", get(get_records))
}

/// POST /records - Record any JSON value. Where it lands depends on consent.
async fn create_record(
    State(state): State<AppState>,
    Json(value): Json<serde_json::Value>,
) -> StatusCode {
    state.writer.write(value);
    StatusCode::ACCEPTED
}

/// GET /api/records/{area} - Records currently held in an area.
async fn get_records(State(state): State<AppState>, Path(area): Path<String>) -> Response {
    let area: StorageArea = match area.parse() {
        Ok(a) => a,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    // Read on the writer queue so the listing never overlaps a migration.
    let store = state.store(area);
    match state.writer.run_exclusive(move || store.read_all()).await {
        Some(Ok(records)) => Json(RecordsResponse {
            area,
            count: records.len(),
            records,
        })
        .into_response(),
        Some(Err(e)) => {
            tracing::error!("Failed to read {} records: {}", area, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage error").into_response()
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "Writer stopped").into_response(),
    }
}
