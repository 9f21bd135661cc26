//! Session bridge middleware.
//!
//! Keeps the backend token cookie consistent with the identity provider
//! session on every request:
//!
//! - A token without a provider session is stripped (the user signed out).
//! - A provider session without a token on a protected page triggers a sync.
//!
//! The decision itself is the pure [`decide`] function so the table can be
//! tested without HTTP.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_cookies::Cookies;
use tracing::{debug, warn};
use url::Url;

use super::{RouteClass, is_static_asset};
use crate::state::AppState;

/// Everything the bridge looks at to decide what to do with a request.
#[derive(Debug, Clone, Copy)]
pub struct BridgeInput<'a> {
    /// The provider verified a session for this request.
    pub authenticated: bool,
    /// The request carries a backend token cookie.
    pub has_token: bool,
    /// Classification of the request path.
    pub route: RouteClass,
    /// Raw `Referer` header.
    pub referer: Option<&'a str>,
}

/// What the bridge does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeDecision {
    /// Hand the request to the router untouched.
    PassThrough,
    /// Delete the stale token cookie, then hand the request on.
    ///
    /// `logout_in_flight` is set when the referer shows the user just left a
    /// protected page, i.e. a sign-out redirect is landing.
    StripToken { logout_in_flight: bool },
    /// Delete the stale token cookie and send the user to `/sign-in`.
    RedirectToSignIn,
    /// No provider session on a non-public route.
    RejectUnauthenticated,
    /// Signed in but no backend token yet: run a sync first.
    RedirectToSync,
}

/// Decide how to treat a request. First matching rule wins.
#[must_use]
pub fn decide(input: &BridgeInput<'_>) -> BridgeDecision {
    if !input.authenticated && input.has_token {
        if input.route.is_public() {
            return BridgeDecision::StripToken {
                logout_in_flight: referer_in_app(input.referer),
            };
        }
        return BridgeDecision::RedirectToSignIn;
    }

    if input.route.is_public() {
        return BridgeDecision::PassThrough;
    }

    if !input.authenticated {
        return BridgeDecision::RejectUnauthenticated;
    }

    if input.route == RouteClass::Protected && !input.has_token {
        return BridgeDecision::RedirectToSync;
    }

    BridgeDecision::PassThrough
}

/// Whether the referer points at a non-public page of this app.
fn referer_in_app(referer: Option<&str>) -> bool {
    referer
        .and_then(|r| Url::parse(r).ok())
        .is_some_and(|url| !RouteClass::of(url.path()).is_public())
}

/// Absolute URL of the current request, built from the public base URL.
#[must_use]
pub fn original_url(base_url: &str, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    format!("{}{path_and_query}", base_url.trim_end_matches('/'))
}

/// Append a single query parameter to a path.
pub(crate) fn with_query(path: &str, key: &str, value: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    format!("{path}?{query}")
}

/// Middleware that bridges the provider session and the backend token.
///
/// Must run inside a `CookieManagerLayer`. Stores the verified
/// [`ProviderSession`](crate::provider::ProviderSession) in the request
/// extensions for the extractors in [`super::auth`].
pub async fn session_bridge_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    if is_static_asset(request.uri().path()) {
        return next.run(request).await;
    }

    let session = match state.provider().authenticate(request.headers()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Provider session rejected, treating request as signed out");
            None
        }
    };

    let token_cookie = state.token_cookie();
    let decision = decide(&BridgeInput {
        authenticated: session.is_some(),
        has_token: token_cookie.is_present(&cookies),
        route: RouteClass::of(request.uri().path()),
        referer: request
            .headers()
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok()),
    });

    match decision {
        BridgeDecision::PassThrough => {}
        BridgeDecision::StripToken { logout_in_flight } => {
            debug!(
                path = %request.uri().path(),
                logout_in_flight,
                "Clearing backend token without provider session"
            );
            token_cookie.delete(&cookies);
        }
        BridgeDecision::RedirectToSignIn => {
            debug!(path = %request.uri().path(), "Stale backend token on protected route");
            token_cookie.delete(&cookies);
            return Redirect::to("/sign-in").into_response();
        }
        BridgeDecision::RejectUnauthenticated => {
            return reject_unauthenticated(&state, request.uri());
        }
        BridgeDecision::RedirectToSync => {
            let original = original_url(&state.config().base_url, request.uri());
            debug!(original = %original, "No backend token, redirecting to sync");
            return Redirect::to(&with_query("/api/sync-xano", "redirect", &original))
                .into_response();
        }
    }

    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}

/// API callers get a 401; browsers are sent to sign in.
fn reject_unauthenticated(state: &AppState, uri: &Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized - Please sign in" })),
        )
            .into_response();
    }

    let original = original_url(&state.config().base_url, uri);
    Redirect::to(&with_query("/sign-in", "redirect_url", &original)).into_response()
}
