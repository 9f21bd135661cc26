//! Backend session token.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque session token issued by the backend after a user sync.
///
/// The bridge never interprets the contents. `Debug` is redacted so the value
/// cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token value, returning `None` for an empty string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Extract the token from the body of a successful sync response.
    ///
    /// - A JSON object with an `authToken` key yields that value.
    /// - Any other body (JSON without `authToken`, or not JSON at all) is
    ///   used verbatim as the token.
    ///
    /// Returns `None` when the extracted value is empty or `authToken` is `null`.
    ///
    /// ```
    /// use xano_bridge_core::SessionToken;
    ///
    /// let token = SessionToken::from_response_body(r#"{"authToken":"xyz"}"#).unwrap();
    /// assert_eq!(token.expose(), "xyz");
    ///
    /// let token = SessionToken::from_response_body("abc123").unwrap();
    /// assert_eq!(token.expose(), "abc123");
    /// ```
    #[must_use]
    pub fn from_response_body(body: &str) -> Option<Self> {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
        else {
            return Self::new(body);
        };

        match map.get("authToken") {
            Some(serde_json::Value::String(token)) => Self::new(token.as_str()),
            Some(serde_json::Value::Null) => None,
            Some(other) => Self::new(other.to_string()),
            None => Self::new(body),
        }
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the raw value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_body_is_the_token() {
        let token = SessionToken::from_response_body("abc123").unwrap();
        assert_eq!(token.expose(), "abc123");
    }

    #[test]
    fn test_auth_token_field_wins() {
        let token = SessionToken::from_response_body(r#"{"authToken":"xyz"}"#).unwrap();
        assert_eq!(token.expose(), "xyz");
    }

    #[test]
    fn test_json_without_auth_token_uses_raw_text() {
        let body = r#"{"status":"ok"}"#;
        let token = SessionToken::from_response_body(body).unwrap();
        assert_eq!(token.expose(), body);
    }

    #[test]
    fn test_non_object_json_uses_raw_text() {
        let token = SessionToken::from_response_body("[1,2]").unwrap();
        assert_eq!(token.expose(), "[1,2]");
    }

    #[test]
    fn test_empty_values_are_rejected() {
        assert!(SessionToken::from_response_body("").is_none());
        assert!(SessionToken::from_response_body(r#"{"authToken":""}"#).is_none());
        assert!(SessionToken::from_response_body(r#"{"authToken":null}"#).is_none());
    }

    #[test]
    fn test_non_string_auth_token_uses_json_text() {
        let token = SessionToken::from_response_body(r#"{"authToken":42}"#).unwrap();
        assert_eq!(token.expose(), "42");
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::new("super-secret-token").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("REDACTED"));
    }
}
