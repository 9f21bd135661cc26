//! Integration test harness for the session bridge.
//!
//! Runs the real router in process:
//! - the identity provider is [`FakeProvider`], which treats the session
//!   credential as the user id
//! - Xano is a `wiremock` server
//! - requests go through `tower::ServiceExt::oneshot`
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p xano-bridge-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, Response, header};
use tower::ServiceExt;
use tower_cookies::CookieManagerLayer;
use wiremock::MockServer;
use xano_bridge::config::BridgeConfig;
use xano_bridge::provider::{IdentityProvider, ProviderError, ProviderSession, session_credential};
use xano_bridge::state::AppState;
use xano_bridge::xano::RetryPolicy;
use xano_bridge_core::{ProviderUser, ProviderUserId};

/// Signed-in user known to [`FakeProvider`].
pub const USER_ID: &str = "user_2abc";

/// Signed-in user whose profile lookup fails.
pub const GHOST_USER_ID: &str = "user_ghost";

/// Credential [`FakeProvider`] rejects as invalid.
pub const INVALID_CREDENTIAL: &str = "expired-jwt";

/// Route of the sync endpoint on the mock Xano server.
pub const SYNC_ROUTE: &str = "/auth/clerk-sync";

/// Public base URL the test app believes it runs on.
pub const BASE_URL: &str = "http://localhost:3000";

/// Identity provider stand-in.
///
/// The request credential (bearer token or `__session` cookie) is taken to be
/// the user id, except [`INVALID_CREDENTIAL`] which fails verification.
#[derive(Debug, Default)]
pub struct FakeProvider {
    users: HashMap<String, ProviderUser>,
}

impl FakeProvider {
    #[must_use]
    pub fn with_user(mut self, user: ProviderUser) -> Self {
        self.users.insert(user.id.as_str().to_string(), user);
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<ProviderSession>, ProviderError> {
        let Some(credential) = session_credential(headers) else {
            return Ok(None);
        };
        if credential == INVALID_CREDENTIAL {
            return Err(ProviderError::InvalidToken("token expired".to_string()));
        }
        let user_id = ProviderUserId::parse(&credential)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;
        Ok(Some(ProviderSession {
            user_id,
            session_id: Some("sess_test".to_string()),
        }))
    }

    async fn current_user(&self, user_id: &ProviderUserId) -> Result<ProviderUser, ProviderError> {
        self.users
            .get(user_id.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::UserNotFound(user_id.to_string()))
    }
}

/// The profile [`FakeProvider`] returns for [`USER_ID`].
///
/// # Panics
///
/// Never; the id is a valid literal.
#[must_use]
pub fn test_user() -> ProviderUser {
    ProviderUser {
        id: ProviderUserId::parse(USER_ID).expect("valid user id"),
        first_name: Some("Ada".to_string()),
        last_name: None,
        username: Some("ada".to_string()),
        email_address: "ada@example.com".to_string(),
        created_at: Some(1_700_000_000),
        updated_at: None,
    }
}

/// A running test application plus its mock Xano backend.
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
    pub xano: MockServer,
}

impl TestContext {
    /// Test app with Xano configured against a fresh mock server.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Test app with extra or overridden environment variables.
    ///
    /// # Panics
    ///
    /// Panics if the resulting configuration is invalid.
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let xano = MockServer::start().await;

        let mut vars: HashMap<String, String> = [
            ("APP_BASE_URL", BASE_URL),
            ("XANO_USERS_API_ROUTE", SYNC_ROUTE.trim_start_matches('/')),
            ("XANO_API_KEY", "xano-test-key"),
            ("CLERK_SECRET_KEY", "sk_test_aB3xY9mK2nL5pQ7rT0uW4zC6"),
            ("CLERK_JWT_KEY", "unused-by-fake-provider"),
            ("CLERK_SIGN_IN_URL", "https://accounts.example.com/sign-in"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.insert("XANO_API_BASE_URL".to_string(), xano.uri());
        for (key, value) in overrides {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config =
            BridgeConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid test config");
        let provider = FakeProvider::default().with_user(test_user());
        let state =
            AppState::with_retry_policy(config, Arc::new(provider), RetryPolicy::immediate(2))
                .expect("state");
        let app = xano_bridge::app(state.clone());

        Self { state, app, xano }
    }

    /// Send a request through the full middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the router fails, which it never does for valid requests.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Send a request straight to the handlers, skipping the session bridge.
    ///
    /// # Panics
    ///
    /// Panics if the router fails.
    pub async fn send_unbridged(&self, request: Request<Body>) -> Response<Body> {
        Router::new()
            .merge(xano_bridge::routes::routes())
            .layer(CookieManagerLayer::new())
            .with_state(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

/// Request builder for `method uri`, optionally signed in and with cookies.
#[derive(Debug)]
pub struct TestRequest {
    method: &'static str,
    uri: String,
    user: Option<String>,
    cookies: Vec<String>,
    referer: Option<String>,
}

impl TestRequest {
    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    #[must_use]
    pub fn post(uri: &str) -> Self {
        Self::new("POST", uri)
    }

    fn new(method: &'static str, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            user: None,
            cookies: Vec::new(),
            referer: None,
        }
    }

    /// Authenticate as [`USER_ID`] through the `__session` cookie.
    #[must_use]
    pub fn signed_in(self) -> Self {
        self.signed_in_as(USER_ID)
    }

    /// Authenticate with an arbitrary credential.
    #[must_use]
    pub fn signed_in_as(mut self, credential: &str) -> Self {
        self.user = Some(credential.to_string());
        self
    }

    /// Attach a backend token cookie.
    #[must_use]
    pub fn with_token(self, token: &str) -> Self {
        self.with_cookie(&format!("xano_auth_token={token}"))
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.cookies.push(cookie.to_string());
        self
    }

    #[must_use]
    pub fn with_referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    /// # Panics
    ///
    /// Panics if the URI or a header value is invalid.
    #[must_use]
    pub fn build(self) -> Request<Body> {
        let mut cookies = self.cookies;
        if let Some(user) = self.user {
            cookies.push(format!("__session={user}"));
        }

        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        if let Some(referer) = self.referer {
            builder = builder.header(header::REFERER, referer);
        }
        builder.body(Body::empty()).expect("valid request")
    }
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a Location header")
        .to_str()
        .expect("ASCII Location")
}

/// All `Set-Cookie` headers on a response.
#[must_use]
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

/// Whether the response deletes the backend token cookie.
#[must_use]
pub fn clears_token(response: &Response<Body>) -> bool {
    set_cookies(response)
        .iter()
        .any(|c| c.starts_with("xano_auth_token=;") && c.contains("Max-Age=0"))
}

/// Read a JSON response body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
