use axum::{extract::State, routing::get, Json, Router};

use crate::models::{ChangeConsentRequest, ConsentResponse, TransitionResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/consent", get(get_consent).put(change_consent))
}

/// GET /consent - Current consent value.
async fn get_consent(State(state): State<AppState>) -> Json<ConsentResponse> {
    Json(ConsentResponse {
        consent: state.consent.current_value(),
    })
}

/// PUT /consent - Change the consent value.
///
/// Responds as soon as the change is queued; the migration it triggers runs
/// on the writer queue ahead of any later write.
async fn change_consent(
    State(state): State<AppState>,
    Json(req): Json<ChangeConsentRequest>,
) -> Json<TransitionResponse> {
    let transition = state.consent.change_to(req.consent);
    tracing::info!("Consent set via API: {}", transition);

    Json(TransitionResponse {
        from: transition.from,
        to: transition.to,
    })
}
