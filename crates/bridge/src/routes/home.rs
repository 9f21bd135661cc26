//! Landing, app status and hosted sign-in/up redirects.

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use url::Url;

use crate::error::{AppError, Result};
use crate::middleware::{OptionalProvider, RequireProvider};
use crate::state::AppState;

/// Query echoed by the landing page (set by a failed sync).
#[derive(Debug, Deserialize)]
pub struct LandingQuery {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub signed_in: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// GET /
///
/// A failed sync lands here with `?error=sync-failed&message=...`. The
/// message is form-encoded exactly once, so `message` is the plain text.
/// Clients written against the double-encoded format (`encodeURIComponent`
/// before setting the query) must not decode it a second time.
pub async fn landing(
    OptionalProvider(session): OptionalProvider,
    Query(query): Query<LandingQuery>,
) -> Json<LandingResponse> {
    Json(LandingResponse {
        signed_in: session.is_some(),
        error: query.error,
        message: query.message,
    })
}

#[derive(Debug, Serialize)]
pub struct AppStatusResponse {
    pub user_id: String,
    pub backend_session: bool,
}

/// GET /app, GET /app/dashboard
pub async fn app_status(
    State(state): State<AppState>,
    RequireProvider(session): RequireProvider,
    cookies: Cookies,
) -> Json<AppStatusResponse> {
    Json(AppStatusResponse {
        user_id: session.user_id.into_inner(),
        backend_session: state.token_cookie().is_present(&cookies),
    })
}

#[derive(Debug, Deserialize)]
pub struct HostedPageQuery {
    pub redirect_url: Option<String>,
}

/// GET /sign-in, /sign-in/*
pub async fn sign_in(
    State(state): State<AppState>,
    Query(query): Query<HostedPageQuery>,
) -> Result<Redirect> {
    hosted_page(
        state.config().clerk.sign_in_url.as_deref(),
        query.redirect_url.as_deref(),
        "sign-in page",
    )
}

/// GET /sign-up, /sign-up/*
pub async fn sign_up(
    State(state): State<AppState>,
    Query(query): Query<HostedPageQuery>,
) -> Result<Redirect> {
    hosted_page(
        state.config().clerk.sign_up_url.as_deref(),
        query.redirect_url.as_deref(),
        "sign-up page",
    )
}

fn hosted_page(
    page_url: Option<&str>,
    redirect_url: Option<&str>,
    what: &str,
) -> Result<Redirect> {
    let page_url = page_url.ok_or_else(|| AppError::NotFound(what.to_string()))?;

    let Some(redirect_url) = redirect_url.filter(|r| !r.is_empty()) else {
        return Ok(Redirect::to(page_url));
    };

    let mut url = Url::parse(page_url)
        .map_err(|e| AppError::Internal(format!("invalid {what} URL: {e}")))?;
    url.query_pairs_mut().append_pair("redirect_url", redirect_url);
    Ok(Redirect::to(url.as_str()))
}
