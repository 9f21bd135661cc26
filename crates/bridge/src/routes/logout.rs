//! Logout endpoints.

use axum::{Json, extract::State, response::Redirect};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::OptionalProvider;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Clear the backend token for a signed-in user.
///
/// GET|POST /api/logout
pub async fn api_logout(
    State(state): State<AppState>,
    OptionalProvider(session): OptionalProvider,
    cookies: Cookies,
) -> Result<Json<LogoutResponse>> {
    let Some(session) = session else {
        return Err(AppError::Unauthorized(
            "Unauthorized - Already logged out".to_string(),
        ));
    };

    state.token_cookie().delete(&cookies);
    clear_sentry_user();
    tracing::info!(user_id = %session.user_id, "Backend token cleared via API");

    Ok(Json(LogoutResponse {
        success: true,
        message: "Logged out and Xano token cleared.",
    }))
}

/// Clear the backend token and leave the app.
///
/// GET /logout
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    clear_sentry_user();
    services::logout(
        state.token_cookie(),
        &cookies,
        &state.config().logout_redirect_url,
    )
}
