//! Backend sync endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::instrument;
use xano_bridge_core::SyncResult;

use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::middleware::{OptionalProvider, RequireProvider};
use crate::provider::ProviderSession;
use crate::services::safe_redirect_target;
use crate::state::AppState;
use crate::xano::sync_user;

/// Message shown when the sync could not even be attempted.
pub const UNEXPECTED_SYNC_ERROR: &str = "An unexpected error occurred during backend sync";

/// Query parameters for the redirect-based sync.
#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    /// Where to go after a successful sync.
    pub redirect: Option<String>,
}

/// Sync the signed-in user, then continue to the requested page.
///
/// GET /api/sync-xano?redirect=...
#[instrument(skip_all)]
pub async fn sync_and_redirect(
    State(state): State<AppState>,
    OptionalProvider(session): OptionalProvider,
    cookies: Cookies,
    Query(query): Query<SyncQuery>,
) -> Redirect {
    let Some(session) = session else {
        return Redirect::to("/sign-in");
    };

    match sync_session(&state, &cookies, &session).await {
        Ok(result) if result.success => {
            let target =
                safe_redirect_target(&state.config().base_url, query.redirect.as_deref());
            Redirect::to(&target)
        }
        Ok(result) => sync_failed(&result.message),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Unexpected error during backend sync"
            );
            sync_failed(UNEXPECTED_SYNC_ERROR)
        }
    }
}

/// Sync the signed-in user and report the outcome as JSON.
///
/// POST /api/sync-xano
#[instrument(skip_all)]
pub async fn sync_json(
    State(state): State<AppState>,
    RequireProvider(session): RequireProvider,
    cookies: Cookies,
) -> Result<(StatusCode, Json<SyncResult>)> {
    let result = sync_session(&state, &cookies, &session).await?;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(result)))
}

async fn sync_session(
    state: &AppState,
    cookies: &Cookies,
    session: &ProviderSession,
) -> std::result::Result<SyncResult, AppError> {
    set_sentry_user(&session.user_id);

    let user = state.provider().current_user(&session.user_id).await?;
    let result = sync_user(state.xano(), state.token_cookie(), cookies, &user).await;

    if result.success {
        add_breadcrumb(
            "sync",
            "User synced with Xano",
            Some(&[("user_id", user.id.as_str())][..]),
        );
    }
    Ok(result)
}

/// Redirect to the landing page with a sync error.
///
/// `message` is encoded once, as an ordinary query value.
fn sync_failed(message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", "sync-failed")
        .append_pair("message", message)
        .finish();
    Redirect::to(&format!("/?{query}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_sync_failed_location() {
        let response = sync_failed("Xano sync failed: boom.").into_response();
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert_eq!(
            location,
            "/?error=sync-failed&message=Xano+sync+failed%3A+boom."
        );
    }
}
