use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use constant_time_eq::constant_time_eq;
use tracing::warn;

use crate::{errors::AppError, infra::app_state::AppState};

/// Proof that the request carried the admin password in `Authorization`.
///
/// The header value is compared verbatim; there is no scheme prefix.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.as_bytes())
            .unwrap_or_default();

        if constant_time_eq(presented, state.admin_password.as_bytes()) {
            Ok(AdminAuth)
        } else {
            warn!(
                path = %parts.uri.path(),
                "rejected command with invalid credential"
            );
            Err(AppError::unauthorized("invalid credential"))
        }
    }
}
