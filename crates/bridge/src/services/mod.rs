//! Request-independent flows used by the route handlers.
//!
//! - `logout` - Clear the backend token and leave the app
//! - `redirect` - Validate post-sync redirect targets

pub mod logout;
pub mod redirect;

pub use logout::logout;
pub use redirect::{DEFAULT_SYNC_REDIRECT, safe_redirect_target};
