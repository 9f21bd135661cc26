//! HTTP route handlers for the bridge.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing (public)
//! GET  /sign-in, /sign-in/*    - Redirect to hosted sign-in (public)
//! GET  /sign-up, /sign-up/*    - Redirect to hosted sign-up (public)
//!
//! # Sync-exempt (provider session required, backend token not)
//! GET  /api/sync-xano          - Sync then redirect to ?redirect=
//! POST /api/sync-xano          - Sync and return the result as JSON
//! GET  /api/logout             - Clear backend token (JSON)
//! POST /api/logout             - Clear backend token (JSON)
//! GET  /logout                 - Clear backend token and redirect
//!
//! # Protected (provider session and backend token required)
//! GET  /api/get-xano-cookie    - Current backend token
//! GET  /app, /app/dashboard    - Session status
//!
//! # Outside the bridge
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness
//! ```

pub mod health;
pub mod home;
pub mod logout;
pub mod sync;
pub mod token;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sync-xano",
            get(sync::sync_and_redirect).post(sync::sync_json),
        )
        .route("/get-xano-cookie", get(token::get_token))
        .route(
            "/logout",
            get(logout::api_logout).post(logout::api_logout),
        )
}

/// Create the hosted sign-in/up redirect routes.
pub fn hosted_page_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(home::sign_in))
        .route("/sign-in/{*rest}", get(home::sign_in))
        .route("/sign-up", get(home::sign_up))
        .route("/sign-up/{*rest}", get(home::sign_up))
}

/// Create all routes that run behind the session bridge.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::landing))
        .merge(hosted_page_routes())
        .route("/app", get(home::app_status))
        .route("/app/dashboard", get(home::app_status))
        .route("/logout", get(logout::logout))
        .nest("/api", api_routes())
}

/// Create the health probe routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
