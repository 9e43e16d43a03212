use axum::{
    Router,
    routing::{get, post},
};
use syncwatch_model::routes;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{commands, feed, state};
use crate::infra::app_state::AppState;

/// Command routes, the state snapshot and the state feed.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(routes::PAUSE, post(commands::pause))
        .route(routes::UNPAUSE, post(commands::unpause))
        .route(routes::SEEK, post(commands::seek))
        .route(routes::CHANGE_MEDIA, post(commands::change_media))
        .route(routes::STATE, get(state::current_state))
        .route(routes::FEED, get(feed::feed_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Mirrors the caller's origin, headers and method, with credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_credentials(true)
}
