//! Logout flow.

use axum::response::Redirect;
use tower_cookies::Cookies;

use crate::cookie::TokenCookieStore;

/// Delete the backend token cookie and redirect to `redirect_url`.
///
/// Safe to call repeatedly: without a token cookie on the request no
/// removal header is emitted, and the redirect is the same.
pub fn logout(store: &TokenCookieStore, cookies: &Cookies, redirect_url: &str) -> Redirect {
    store.delete(cookies);
    tracing::info!(redirect_url = %redirect_url, "Backend token cleared");
    Redirect::to(redirect_url)
}
