//! Authentication extractors.
//!
//! Handlers get the provider session through these extractors. The session
//! bridge middleware normally verified it already and left it in the request
//! extensions; otherwise the provider is asked directly.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::provider::ProviderSession;
use crate::state::AppState;

/// Extractor that requires a provider session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireProvider(session): RequireProvider,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", session.user_id)
/// }
/// ```
pub struct RequireProvider(pub ProviderSession);

/// Rejection returned when a provider session is required but missing.
pub enum AuthRejection {
    /// Redirect to the sign-in page (for browser requests).
    RedirectToSignIn,
    /// Unauthorized JSON response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn => Redirect::to("/sign-in").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized - Please sign in" })),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireProvider {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalProvider(session) = OptionalProvider::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalProvider(None));

        session.map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToSignIn
            }
        })
    }
}

/// Extractor that optionally gets the provider session.
///
/// Unlike `RequireProvider`, this does not reject signed-out requests.
/// Invalid credentials count as signed out.
pub struct OptionalProvider(pub Option<ProviderSession>);

impl FromRequestParts<AppState> for OptionalProvider {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<ProviderSession>() {
            return Ok(Self(Some(session.clone())));
        }

        let session = match state.provider().authenticate(&parts.headers).await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid provider credential");
                None
            }
        };

        if let Some(session) = &session {
            parts.extensions.insert(session.clone());
        }

        Ok(Self(session))
    }
}
