use axum::{Json, extract::State};
use syncwatch_model::StateFeedMessage;

use crate::infra::app_state::AppState;

/// Current authoritative state, recomputed for this instant.
pub async fn current_state(
    State(state): State<AppState>,
) -> Json<StateFeedMessage> {
    Json(state.clock.lock().snapshot())
}
