//! HTTP client for the Xano user-sync endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, instrument};
use xano_bridge_core::{BackendUserPayload, SessionToken};

use super::XanoError;
use super::retry::{RetryPolicy, retry};
use crate::config::XanoConfig;

/// Client for the Xano user-sync endpoint.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct XanoClient {
    inner: Arc<XanoClientInner>,
}

struct XanoClientInner {
    client: reqwest::Client,
    config: XanoConfig,
    policy: RetryPolicy,
}

impl XanoClient {
    /// Create a new Xano client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &XanoConfig, policy: RetryPolicy) -> Result<Self, XanoError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(XanoClientInner {
                client,
                config: config.clone(),
                policy,
            }),
        })
    }

    /// Whether the sync endpoint settings are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.config.missing_setting().is_none()
    }

    /// Push a user to Xano and return the backend session token.
    ///
    /// Missing settings fail immediately. Everything else (transport errors,
    /// non-2xx answers, an empty token) is retried according to the policy.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    #[instrument(skip_all, fields(user_id = %payload.clerk_user_id))]
    pub async fn request_token(
        &self,
        payload: &BackendUserPayload,
    ) -> Result<SessionToken, XanoError> {
        if let Some(setting) = self.inner.config.missing_setting() {
            return Err(XanoError::MissingConfig(setting));
        }

        let url = self.inner.config.sync_url();
        retry(&self.inner.policy, |attempt| self.post_user(&url, payload, attempt)).await
    }

    /// One attempt against the sync endpoint.
    async fn post_user(
        &self,
        url: &str,
        payload: &BackendUserPayload,
        attempt: u32,
    ) -> Result<SessionToken, XanoError> {
        debug!(url = %url, attempt = attempt + 1, "Posting user to Xano");

        let mut request = self.inner.client.post(url).json(payload);
        if let Some(key) = &self.inner.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(url, response).await);
        }

        let body = response.text().await?;
        SessionToken::from_response_body(&body).ok_or(XanoError::MissingToken)
    }
}

/// Turn a non-success response into an [`XanoError::Api`], logging the details.
async fn error_from_response(url: &str, response: reqwest::Response) -> XanoError {
    let status = response.status();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();
    let body = response.text().await.unwrap_or_default();

    tracing::error!(
        status = status.as_u16(),
        reason = status.canonical_reason().unwrap_or(""),
        url = %url,
        headers = ?headers,
        body = %body.chars().take(500).collect::<String>(),
        "Xano API returned non-success status"
    );

    XanoError::Api {
        status: status.as_u16(),
        message: api_error_message(status, &body),
    }
}

/// Compose the human-readable part of an API error.
///
/// A JSON object body contributes its `message` field, then its `error`
/// field. Other JSON falls back to the reason phrase. A body that is not
/// JSON at all is used verbatim unless it is empty.
fn api_error_message(status: StatusCode, body: &str) -> String {
    let reason = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string()
    };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(field_text)
            .unwrap_or_else(reason),
        Ok(_) => reason(),
        Err(_) if body.is_empty() => reason(),
        Err(_) => body.to_string(),
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
