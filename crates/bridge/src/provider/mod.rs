//! Identity provider integration.
//!
//! The bridge consumes two things from the identity provider:
//! - **Session verification**: who (if anyone) is signed in for this request
//! - **User profile lookup**: the fields pushed to the backend during sync
//!
//! Both sit behind the [`IdentityProvider`] trait so the middleware and
//! handlers never depend on a specific vendor. [`ClerkProvider`] is the
//! production implementation.

mod clerk;

pub use clerk::ClerkProvider;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use thiserror::Error;
use tower_cookies::cookie::Cookie;
use xano_bridge_core::{ProviderUser, ProviderUserId};

/// Name of the cookie holding the provider's session token.
pub const SESSION_COOKIE_NAME: &str = "__session";

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Session token is present but failed verification.
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// The user does not exist at the provider.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Verification key could not be loaded.
    #[error("Invalid verification key: {0}")]
    InvalidKey(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A verified provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    /// Signed-in user.
    pub user_id: ProviderUserId,
    /// Provider session id, when the token carries one.
    pub session_id: Option<String>,
}

/// Contract consumed from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify the request's session credential.
    ///
    /// Returns `Ok(None)` when the request carries no credential at all.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is present but invalid or expired.
    async fn authenticate(&self, headers: &HeaderMap)
    -> Result<Option<ProviderSession>, ProviderError>;

    /// Fetch the profile of a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be loaded.
    async fn current_user(&self, user_id: &ProviderUserId) -> Result<ProviderUser, ProviderError>;
}

/// Find the provider session credential in a request.
///
/// An `Authorization: Bearer` header takes precedence over the session cookie.
#[must_use]
pub fn session_credential(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE_NAME && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_credential_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        headers.insert(header::COOKIE, HeaderValue::from_static("__session=cookie.jwt"));

        assert_eq!(session_credential(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_credential_from_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=cookie.jwt; xano_auth_token=t"),
        );

        assert_eq!(session_credential(&headers).as_deref(), Some("cookie.jwt"));
    }

    #[test]
    fn test_no_credential() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("__session="));
        assert_eq!(session_credential(&headers), None);
        assert_eq!(session_credential(&HeaderMap::new()), None);
    }
}
