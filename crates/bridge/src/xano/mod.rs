//! Xano backend integration.
//!
//! A sync pushes the signed-in user's profile to the Xano user-sync endpoint
//! and receives a backend session token in return. The token is stored in an
//! HTTP-only cookie so later requests can talk to Xano directly.

mod client;
mod retry;
mod sync;

pub use client::XanoClient;
pub use retry::{RetryPolicy, retry};
pub use sync::sync_user;

use thiserror::Error;

/// Errors that can occur while syncing a user to Xano.
#[derive(Debug, Error)]
pub enum XanoError {
    /// A required setting is empty. Never retried.
    #[error("{0} environment variable is not defined.")]
    MissingConfig(&'static str),

    /// Transport failure (connection refused, timeout, bad body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sync endpoint answered with a non-success status.
    #[error("Failed to sync user with Xano: {status} - {message}")]
    Api { status: u16, message: String },

    /// The endpoint succeeded but returned no usable token.
    #[error("Xano did not return a valid auth token.")]
    MissingToken,
}
