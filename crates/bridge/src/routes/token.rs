//! Backend token lookup for client code.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::error::{AppError, Result};
use crate::middleware::OptionalProvider;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: Option<String>,
}

/// Return the HTTP-only backend token to the signed-in user.
///
/// GET /api/get-xano-cookie
pub async fn get_token(
    State(state): State<AppState>,
    OptionalProvider(session): OptionalProvider,
    cookies: Cookies,
) -> Result<Json<TokenResponse>> {
    if session.is_none() {
        return Err(AppError::Unauthorized(
            "Unauthorized - Please sign in".to_string(),
        ));
    }

    let token = state
        .token_cookie()
        .get(&cookies)
        .map(xano_bridge_core::SessionToken::into_inner);
    Ok(Json(TokenResponse { token }))
}
