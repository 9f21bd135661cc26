//! Clerk ⇄ Xano session bridge.
//!
//! Keeps a Xano backend session token in an HTTP-only cookie in step with
//! the user's Clerk session. The binary in `main.rs` wires this library to
//! the environment; tests drive [`app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod cookie;
pub mod error;
pub mod middleware;
pub mod provider;
pub mod routes;
pub mod services;
pub mod state;
pub mod xano;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
///
/// Every route except the health probes runs behind the session bridge.
pub fn app(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = tracing::field::Empty,
        )
    });

    Router::new()
        .merge(routes::routes())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_bridge_middleware,
        ))
        .layer(CookieManagerLayer::new())
        .merge(routes::health_routes())
        .layer(from_fn(middleware::request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
