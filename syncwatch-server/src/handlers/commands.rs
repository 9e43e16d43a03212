use std::time::Duration;

use axum::{Json, extract::State};
use syncwatch_model::{ChangeMediaRequest, SeekRequest, StateFeedMessage};

use super::auth::AdminAuth;
use crate::infra::app_state::AppState;

pub async fn pause(
    _: AdminAuth,
    State(state): State<AppState>,
) -> Json<StateFeedMessage> {
    let mut clock = state.clock.lock();
    clock.pause();
    Json(clock.snapshot())
}

pub async fn unpause(
    _: AdminAuth,
    State(state): State<AppState>,
) -> Json<StateFeedMessage> {
    let mut clock = state.clock.lock();
    clock.unpause();
    Json(clock.snapshot())
}

pub async fn seek(
    _: AdminAuth,
    State(state): State<AppState>,
    Json(request): Json<SeekRequest>,
) -> Json<StateFeedMessage> {
    let mut clock = state.clock.lock();
    clock.seek(Duration::from_millis(request.new_ts_milliseconds));
    Json(clock.snapshot())
}

pub async fn change_media(
    _: AdminAuth,
    State(state): State<AppState>,
    Json(request): Json<ChangeMediaRequest>,
) -> Json<StateFeedMessage> {
    let mut clock = state.clock.lock();
    clock.change_media(request.new_url);
    Json(clock.snapshot())
}
