pub mod batches;
pub mod consent;
pub mod health;
pub mod records;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(records::routes())
        .merge(consent::routes())
        .merge(batches::routes())
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
