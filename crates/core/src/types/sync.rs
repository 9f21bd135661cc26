//! Outcome of a user sync.

use serde::{Deserialize, Serialize};

/// Result of syncing a user with the backend.
///
/// Failures are reported through this value rather than as errors so callers
/// can degrade gracefully (redirect with a message, render JSON, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
}

impl SyncResult {
    /// A successful sync.
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: "User synced with Xano successfully.".to_string(),
        }
    }

    /// A failed sync, carrying the underlying error description.
    #[must_use]
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("Xano sync failed: {reason}."),
        }
    }
}
