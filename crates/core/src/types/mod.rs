//! Core types for the session bridge.
//!
//! Request/response DTOs shared between the bridge service and its tests.

pub mod id;
pub mod sync;
pub mod token;
pub mod user;

pub use id::{ProviderUserId, ProviderUserIdError};
pub use sync::SyncResult;
pub use token::SessionToken;
pub use user::{BackendUserPayload, ProviderUser};
