//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::cookie::TokenCookieStore;
use crate::provider::IdentityProvider;
use crate::xano::{RetryPolicy, XanoClient, XanoError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the identity provider and the Xano client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    provider: Arc<dyn IdentityProvider>,
    xano: XanoClient,
    token_cookie: TokenCookieStore,
}

impl AppState {
    /// Create a new application state with the default sync retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the Xano HTTP client cannot be built.
    pub fn new(
        config: BridgeConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, XanoError> {
        Self::with_retry_policy(config, provider, RetryPolicy::default())
    }

    /// Create a new application state with a custom sync retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the Xano HTTP client cannot be built.
    pub fn with_retry_policy(
        config: BridgeConfig,
        provider: Arc<dyn IdentityProvider>,
        policy: RetryPolicy,
    ) -> Result<Self, XanoError> {
        let xano = XanoClient::new(&config.xano, policy)?;
        let token_cookie = TokenCookieStore::new(&config.cookie);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                provider,
                xano,
                token_cookie,
            }),
        })
    }

    /// Get a reference to the bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.inner.provider.as_ref()
    }

    /// Get a reference to the Xano client.
    #[must_use]
    pub fn xano(&self) -> &XanoClient {
        &self.inner.xano
    }

    /// Get a reference to the backend token cookie store.
    #[must_use]
    pub fn token_cookie(&self) -> &TokenCookieStore {
        &self.inner.token_cookie
    }
}
