//! Backend token cookie.
//!
//! The token issued by Xano lives in a single HTTP-only cookie. This module
//! owns its attributes so that setting and deleting always agree on name and
//! path.
//!
//! Xano tokens are opaque text, so the value is percent-encoded on the way
//! out (the `encodeURIComponent` character set) and decoded on the way in.
//! An unencoded value such as `abc;def` or one with a trailing newline would
//! otherwise be truncated by the browser or dropped from the response.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies};
use xano_bridge_core::SessionToken;

use crate::config::CookieConfig;

/// Characters left as-is in the cookie value.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_value(token: &str) -> String {
    utf8_percent_encode(token, COOKIE_VALUE).to_string()
}

fn decode_value(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Reads, writes and deletes the backend token cookie.
#[derive(Debug, Clone)]
pub struct TokenCookieStore {
    name: String,
    max_age_secs: i64,
    secure: bool,
}

impl TokenCookieStore {
    #[must_use]
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            name: config.name.clone(),
            max_age_secs: config.max_age_secs,
            secure: config.secure,
        }
    }

    /// Cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie lifetime in seconds.
    #[must_use]
    pub const fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Current token, if the request carries a non-empty one.
    #[must_use]
    pub fn get(&self, cookies: &Cookies) -> Option<SessionToken> {
        cookies
            .get(&self.name)
            .and_then(|c| SessionToken::new(decode_value(c.value())))
    }

    /// Whether the request carries a token.
    #[must_use]
    pub fn is_present(&self, cookies: &Cookies) -> bool {
        self.get(cookies).is_some()
    }

    /// Store a token for the configured lifetime.
    pub fn set(&self, cookies: &Cookies, token: &SessionToken) {
        cookies.add(self.token_cookie(encode_value(token.expose())));
    }

    /// Remove the token.
    ///
    /// Emits a removal `Set-Cookie` only if the request carried the cookie.
    pub fn delete(&self, cookies: &Cookies) {
        cookies.remove(self.removal_cookie());
    }

    fn token_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn store(secure: bool) -> TokenCookieStore {
        TokenCookieStore::new(&CookieConfig {
            name: "xano_auth_token".to_string(),
            max_age_secs: 3600,
            secure,
        })
    }

    #[test]
    fn test_token_cookie_attributes() {
        let cookie = store(true).token_cookie("abc".to_string());

        assert_eq!(cookie.name(), "xano_auth_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_insecure_for_plain_http() {
        let cookie = store(false).token_cookie("abc".to_string());
        assert_eq!(cookie.secure(), Some(false));
        assert!(!cookie.to_string().contains("Secure"));
    }

    #[test]
    fn test_value_encoding_is_header_safe() {
        for (token, encoded) in [
            ("abc123", "abc123"),
            ("abc123\n", "abc123%0A"),
            ("tökén", "t%C3%B6k%C3%A9n"),
            ("abc;def", "abc%3Bdef"),
            ("a b+c=d", "a%20b%2Bc%3Dd"),
        ] {
            let value = encode_value(token);
            assert_eq!(value, encoded);
            assert!(HeaderValue::from_str(&store(true).token_cookie(value).to_string()).is_ok());
            assert_eq!(decode_value(encoded), token);
        }
    }

    #[test]
    fn test_decode_leaves_plain_values() {
        assert_eq!(decode_value("eyJhbGciOi.payload.sig"), "eyJhbGciOi.payload.sig");
    }

    #[test]
    fn test_removal_cookie_matches_path() {
        let cookie = store(true).removal_cookie();
        assert_eq!(cookie.name(), "xano_auth_token");
        assert_eq!(cookie.path(), Some("/"));
    }
}
