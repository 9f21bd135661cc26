//! Clerk implementation of [`IdentityProvider`].
//!
//! - Session tokens are RS256 JWTs verified locally against the instance's
//!   PEM public key (no network round-trip per request).
//! - User profiles come from the Clerk Backend API (`GET /v1/users/{id}`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use xano_bridge_core::{ProviderUser, ProviderUserId};

use super::{IdentityProvider, ProviderError, ProviderSession, session_credential};
use crate::config::ClerkConfig;

/// Clock skew tolerated when checking `exp`/`nbf`.
const LEEWAY_SECS: u64 = 5;

/// Client for Clerk session verification and user lookup.
#[derive(Clone)]
pub struct ClerkProvider {
    inner: Arc<ClerkProviderInner>,
}

struct ClerkProviderInner {
    client: reqwest::Client,
    api_url: String,
    secret_key: SecretString,
    decoding_key: DecodingKey,
    validation: Validation,
    authorized_parties: Vec<String>,
}

/// Claims Clerk puts in a session token.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    sid: Option<String>,
    azp: Option<String>,
}

/// User object returned by the Clerk Backend API.
#[derive(Debug, Deserialize)]
struct ClerkUser {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
    /// Milliseconds since the epoch.
    created_at: Option<i64>,
    /// Milliseconds since the epoch.
    updated_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    id: String,
    email_address: String,
}

impl ClerkProvider {
    /// Create a new Clerk provider.
    ///
    /// # Errors
    ///
    /// Returns error if the PEM key is invalid or the HTTP client fails to build.
    pub fn new(config: &ClerkConfig) -> Result<Self, ProviderError> {
        let decoding_key = DecodingKey::from_rsa_pem(config.jwt_key.as_bytes())
            .map_err(|e| ProviderError::InvalidKey(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = LEEWAY_SECS;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClerkProviderInner {
                client,
                api_url: config.api_url.clone(),
                secret_key: config.secret_key.clone(),
                decoding_key,
                validation,
                authorized_parties: config.authorized_parties.clone(),
            }),
        })
    }

    /// Verify a session JWT and return the session it describes.
    fn verify(&self, token: &str) -> Result<ProviderSession, ProviderError> {
        let data = decode::<SessionClaims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        if let Some(azp) = &claims.azp
            && !self.inner.authorized_parties.is_empty()
            && !self.inner.authorized_parties.iter().any(|p| p == azp)
        {
            return Err(ProviderError::InvalidToken(format!(
                "unauthorized party '{azp}'"
            )));
        }

        let user_id = ProviderUserId::parse(&claims.sub)
            .map_err(|e| ProviderError::InvalidToken(e.to_string()))?;

        Ok(ProviderSession {
            user_id,
            session_id: claims.sid,
        })
    }
}

#[async_trait]
impl IdentityProvider for ClerkProvider {
    async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<ProviderSession>, ProviderError> {
        let Some(token) = session_credential(headers) else {
            return Ok(None);
        };
        self.verify(&token).map(Some)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn current_user(&self, user_id: &ProviderUserId) -> Result<ProviderUser, ProviderError> {
        let url = format!("{}/v1/users/{}", self.inner.api_url, user_id.as_str());

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::UserNotFound(user_id.to_string()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: ClerkUser = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        debug!("Loaded Clerk user profile");

        convert_user(user)
    }
}

/// Map a Clerk user onto the provider-neutral [`ProviderUser`].
fn convert_user(user: ClerkUser) -> Result<ProviderUser, ProviderError> {
    let id = ProviderUserId::parse(&user.id).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let primary = user.primary_email_address_id.as_deref();
    let email_address = user
        .email_addresses
        .iter()
        .find(|e| Some(e.id.as_str()) == primary)
        .or_else(|| user.email_addresses.first())
        .map(|e| e.email_address.clone())
        .unwrap_or_default();

    Ok(ProviderUser {
        id,
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
        email_address,
        created_at: user.created_at.map(millis_to_secs),
        updated_at: user.updated_at.map(millis_to_secs),
    })
}

const fn millis_to_secs(millis: i64) -> i64 {
    millis.div_euclid(1000)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderValue, header};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PRIVATE_KEY: &str = include_str!("../../testdata/clerk_test_private_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../testdata/clerk_test_public_key.pem");
    const OTHER_PUBLIC_KEY: &str = include_str!("../../testdata/other_public_key.pem");
    const SECRET_KEY: &str = "sk_test_aB3xY9mK2nL5pQ7rT0uW4zC6";

    fn config(api_url: &str, jwt_key: &str, parties: &[&str]) -> ClerkConfig {
        ClerkConfig {
            secret_key: SecretString::from(SECRET_KEY),
            jwt_key: jwt_key.to_string(),
            api_url: api_url.to_string(),
            authorized_parties: parties.iter().map(|p| (*p).to_string()).collect(),
            sign_in_url: None,
            sign_up_url: None,
        }
    }

    fn now() -> i64 {
        i64::try_from(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        )
        .unwrap()
    }

    fn sign(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::RS256),
            claims,
            &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_authenticate_valid_session_cookie() {
        let provider = ClerkProvider::new(&config("http://unused", PUBLIC_KEY, &[])).unwrap();
        let token = sign(&json!({
            "sub": "user_2abc",
            "sid": "sess_1",
            "exp": now() + 60,
            "nbf": now() - 10,
        }));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("__session={token}")).unwrap(),
        );

        let session = provider.authenticate(&headers).await.unwrap().unwrap();
        assert_eq!(session.user_id.as_str(), "user_2abc");
        assert_eq!(session.session_id.as_deref(), Some("sess_1"));
    }

    #[tokio::test]
    async fn test_authenticate_without_credential() {
        let provider = ClerkProvider::new(&config("http://unused", PUBLIC_KEY, &[])).unwrap();
        assert!(provider.authenticate(&HeaderMap::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_expired_token() {
        let provider = ClerkProvider::new(&config("http://unused", PUBLIC_KEY, &[])).unwrap();
        let token = sign(&json!({ "sub": "user_2abc", "exp": now() - 3600 }));

        let err = provider.authenticate(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_key() {
        let provider = ClerkProvider::new(&config("http://unused", OTHER_PUBLIC_KEY, &[])).unwrap();
        let token = sign(&json!({ "sub": "user_2abc", "exp": now() + 60 }));

        assert!(provider.authenticate(&bearer(&token)).await.is_err());
    }

    #[tokio::test]
    async fn test_authenticate_checks_authorized_parties() {
        let provider = ClerkProvider::new(&config(
            "http://unused",
            PUBLIC_KEY,
            &["https://app.example.org"],
        ))
        .unwrap();

        let allowed = sign(&json!({
            "sub": "user_2abc",
            "exp": now() + 60,
            "azp": "https://app.example.org",
        }));
        assert!(provider.authenticate(&bearer(&allowed)).await.unwrap().is_some());

        let foreign = sign(&json!({
            "sub": "user_2abc",
            "exp": now() + 60,
            "azp": "https://evil.example.net",
        }));
        assert!(matches!(
            provider.authenticate(&bearer(&foreign)).await,
            Err(ProviderError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let result = ClerkProvider::new(&config("http://unused", "not a pem", &[]));
        assert!(matches!(result, Err(ProviderError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_current_user_maps_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/user_2abc"))
            .and(header_matcher("authorization", format!("Bearer {SECRET_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user_2abc",
                "first_name": "Ada",
                "last_name": null,
                "username": "ada",
                "primary_email_address_id": "idn_2",
                "email_addresses": [
                    { "id": "idn_1", "email_address": "old@example.com" },
                    { "id": "idn_2", "email_address": "ada@example.com" }
                ],
                "created_at": 1_700_000_000_999_i64,
                "updated_at": 1_700_000_100_000_i64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ClerkProvider::new(&config(&server.uri(), PUBLIC_KEY, &[])).unwrap();
        let user = provider
            .current_user(&ProviderUserId::parse("user_2abc").unwrap())
            .await
            .unwrap();

        assert_eq!(user.email_address, "ada@example.com");
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.last_name, None);
        assert_eq!(user.created_at, Some(1_700_000_000));
        assert_eq!(user.updated_at, Some(1_700_000_100));
    }

    #[tokio::test]
    async fn test_current_user_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = ClerkProvider::new(&config(&server.uri(), PUBLIC_KEY, &[])).unwrap();
        let err = provider
            .current_user(&ProviderUserId::parse("user_gone").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::UserNotFound(_)));
    }

    #[test]
    fn test_email_falls_back_to_first_address() {
        let user = ClerkUser {
            id: "user_1".to_string(),
            first_name: None,
            last_name: None,
            username: None,
            primary_email_address_id: None,
            email_addresses: vec![ClerkEmailAddress {
                id: "idn_1".to_string(),
                email_address: "first@example.com".to_string(),
            }],
            created_at: None,
            updated_at: None,
        };

        let converted = convert_user(user).unwrap();
        assert_eq!(converted.email_address, "first@example.com");
        assert_eq!(converted.created_at, None);
    }
}
