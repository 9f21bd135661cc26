//! Identity provider user snapshot and its backend wire shape.

use serde::{Deserialize, Serialize};

use super::ProviderUserId;

/// Read-only snapshot of a user as reported by the identity provider.
///
/// Built fresh for every sync; never persisted by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// Stable provider user id.
    pub id: ProviderUserId,
    /// Given name, if the user provided one.
    pub first_name: Option<String>,
    /// Family name, if the user provided one.
    pub last_name: Option<String>,
    /// Username, if the provider has usernames enabled.
    pub username: Option<String>,
    /// Primary email address.
    pub email_address: String,
    /// Account creation time (Unix seconds).
    pub created_at: Option<i64>,
    /// Last profile update time (Unix seconds).
    pub updated_at: Option<i64>,
}

/// User record in the shape the backend's user-sync endpoint expects.
///
/// Missing names are sent as empty strings; missing timestamps as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUserPayload {
    pub clerk_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub email: String,
    /// Lifetime the backend should give the issued token, in seconds.
    pub authtoken_max_age: i64,
}

impl BackendUserPayload {
    /// Map a provider user onto the backend field names.
    #[must_use]
    pub fn from_provider_user(user: &ProviderUser, authtoken_max_age: i64) -> Self {
        Self {
            clerk_user_id: user.id.as_str().to_owned(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email_address.clone(),
            authtoken_max_age,
        }
    }
}
