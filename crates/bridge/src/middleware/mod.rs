//! HTTP middleware stack for the bridge.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Cookie manager (`tower-cookies` jar)
//! 5. Session bridge (provider session vs. backend token cookie)
//!
//! Health probes are mounted outside the session bridge. Static asset paths
//! (by file extension) pass through it untouched.

pub mod auth;
pub mod bridge;
pub mod request_id;
pub mod route_class;

pub use auth::{AuthRejection, OptionalProvider, RequireProvider};
pub use bridge::{BridgeDecision, BridgeInput, decide, session_bridge_middleware};
pub use request_id::request_id_middleware;
pub use route_class::{RouteClass, is_static_asset};
