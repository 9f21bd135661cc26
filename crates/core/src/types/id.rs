//! Identity provider user identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProviderUserId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderUserIdError {
    /// The input string is empty or whitespace.
    #[error("provider user id cannot be empty")]
    Empty,
}

/// Stable, opaque user identifier issued by the identity provider.
///
/// The bridge never interprets the value; it is forwarded to the backend as
/// `clerk_user_id` and used to look up the user's profile.
///
/// ```
/// use xano_bridge_core::ProviderUserId;
///
/// let id = ProviderUserId::parse("user_2abc").unwrap();
/// assert_eq!(id.as_str(), "user_2abc");
/// assert!(ProviderUserId::parse("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderUserId(String);

impl ProviderUserId {
    /// Parse a `ProviderUserId`, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderUserIdError::Empty`] if the input is blank.
    pub fn parse(s: &str) -> Result<Self, ProviderUserIdError> {
        if s.trim().is_empty() {
            return Err(ProviderUserIdError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProviderUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProviderUserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(ProviderUserId::parse(""), Err(ProviderUserIdError::Empty));
        assert_eq!(
            ProviderUserId::parse(" \t"),
            Err(ProviderUserIdError::Empty)
        );
    }

    #[test]
    fn test_serializes_transparently() {
        let id = ProviderUserId::parse("user_123").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user_123\"");
        assert_eq!(id.to_string(), "user_123");
    }
}
