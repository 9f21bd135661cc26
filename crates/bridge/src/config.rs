//! Bridge configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLERK_SECRET_KEY` - Clerk Backend API secret key (high entropy)
//! - `CLERK_JWT_KEY` - PEM-encoded public key used to verify Clerk session tokens
//!
//! ## Required before a sync can succeed
//! - `XANO_API_BASE_URL` - Xano API group base URL
//! - `XANO_USERS_API_ROUTE` - Route of the user-sync endpoint inside that group
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `APP_BASE_URL` - Public URL of this app (default: `http://localhost:3000`)
//! - `XANO_API_KEY` - Bearer key sent to the user-sync endpoint
//! - `XANO_REQUEST_TIMEOUT_SECS` - Per-attempt timeout for the sync call (default: 10)
//! - `XANO_AUTH_COOKIE_NAME` - Token cookie name (default: `xano_auth_token`)
//! - `XANO_AUTH_COOKIE_MAX_AGE` - Token cookie lifetime in seconds (default: 604800)
//! - `LOGOUT_REDIRECT_URL` - Where `/logout` sends the user (default: `/`)
//! - `CLERK_API_URL` - Clerk Backend API URL (default: `https://api.clerk.com`)
//! - `CLERK_AUTHORIZED_PARTIES` - Comma-separated list of accepted `azp` origins
//! - `CLERK_SIGN_IN_URL` - Hosted sign-in page
//! - `CLERK_SIGN_UP_URL` - Hosted sign-up page
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default name of the backend token cookie.
pub const DEFAULT_COOKIE_NAME: &str = "xano_auth_token";

/// Default token cookie lifetime (1 week).
pub const DEFAULT_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Bridge application configuration.
///
/// Built once at process start and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the app (used to rebuild original request URLs)
    pub base_url: String,
    /// Xano user-sync endpoint settings
    pub xano: XanoConfig,
    /// Backend token cookie attributes
    pub cookie: CookieConfig,
    /// Where the logout flow redirects to
    pub logout_redirect_url: String,
    /// Clerk identity provider settings
    pub clerk: ClerkConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Xano user-sync endpoint configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct XanoConfig {
    /// API group base URL (may be empty; checked before every sync)
    pub api_base_url: String,
    /// User-sync route within the API group (may be empty; checked before every sync)
    pub users_api_route: String,
    /// Bearer key for the sync endpoint
    pub api_key: Option<SecretString>,
    /// Timeout applied to each sync attempt
    pub request_timeout: Duration,
}

impl std::fmt::Debug for XanoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XanoConfig")
            .field("api_base_url", &self.api_base_url)
            .field("users_api_route", &self.users_api_route)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl XanoConfig {
    /// Name of the first required sync setting that is empty, if any.
    #[must_use]
    pub fn missing_setting(&self) -> Option<&'static str> {
        if self.api_base_url.trim().is_empty() {
            Some("XANO_API_BASE_URL")
        } else if self.users_api_route.trim().is_empty() {
            Some("XANO_USERS_API_ROUTE")
        } else {
            None
        }
    }

    /// Full URL of the user-sync endpoint: `{base}/{route}`.
    #[must_use]
    pub fn sync_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.users_api_route.trim_start_matches('/')
        )
    }
}

/// Attributes of the backend token cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie lifetime in seconds; also sent to Xano as `authtoken_max_age`
    pub max_age_secs: i64,
    /// Whether to set the `Secure` attribute (HTTPS deployments)
    pub secure: bool,
}

/// Clerk identity provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct ClerkConfig {
    /// Backend API secret key
    pub secret_key: SecretString,
    /// PEM public key for session token verification
    pub jwt_key: String,
    /// Backend API base URL
    pub api_url: String,
    /// Accepted `azp` claim values (empty = accept any)
    pub authorized_parties: Vec<String>,
    /// Hosted sign-in page
    pub sign_in_url: Option<String>,
    /// Hosted sign-up page
    pub sign_up_url: Option<String>,
}

impl std::fmt::Debug for ClerkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkConfig")
            .field("secret_key", &"[REDACTED]")
            .field("jwt_key", &"<pem>")
            .field("api_url", &self.api_url)
            .field("authorized_parties", &self.authorized_parties)
            .field("sign_in_url", &self.sign_in_url)
            .field("sign_up_url", &self.sign_up_url)
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`BridgeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let host = env
            .or_default("APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;
        let base_url = env
            .or_default("APP_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("APP_BASE_URL".to_string(), e.to_string()))?;

        let xano = XanoConfig::from_env(&env)?;
        let cookie = CookieConfig::from_env(&env, base_url.starts_with("https://"))?;
        let logout_redirect_url = env.or_default("LOGOUT_REDIRECT_URL", "/");
        let clerk = ClerkConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            base_url,
            xano,
            cookie,
            logout_redirect_url,
            clerk,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl XanoConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let timeout_secs = env
            .or_default("XANO_REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "XANO_REQUEST_TIMEOUT_SECS".to_string(),
                    "must be a positive number of seconds".to_string(),
                )
            })?;

        Ok(Self {
            api_base_url: env.or_default("XANO_API_BASE_URL", ""),
            users_api_route: env.or_default("XANO_USERS_API_ROUTE", ""),
            api_key: env.optional("XANO_API_KEY").map(SecretString::from),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl CookieConfig {
    fn from_env(env: &Env<'_>, secure: bool) -> Result<Self, ConfigError> {
        let max_age_secs = match env.optional("XANO_AUTH_COOKIE_MAX_AGE") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "XANO_AUTH_COOKIE_MAX_AGE".to_string(),
                        format!("expected a positive number of seconds, got '{raw}'"),
                    )
                })?,
            None => DEFAULT_COOKIE_MAX_AGE_SECS,
        };

        Ok(Self {
            name: env.or_default("XANO_AUTH_COOKIE_NAME", DEFAULT_COOKIE_NAME),
            max_age_secs,
            secure,
        })
    }
}

impl ClerkConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let authorized_parties = env
            .optional("CLERK_AUTHORIZED_PARTIES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|party| !party.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            secret_key: env.validated_secret("CLERK_SECRET_KEY")?,
            // Keys pasted into single-line env files often carry literal "\n"
            jwt_key: env.required("CLERK_JWT_KEY")?.replace("\\n", "\n"),
            api_url: env
                .or_default("CLERK_API_URL", "https://api.clerk.com")
                .trim_end_matches('/')
                .to_string(),
            authorized_parties,
            sign_in_url: env.optional("CLERK_SIGN_IN_URL"),
            sign_up_url: env.optional("CLERK_SIGN_UP_URL"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup wrapper so configuration can be loaded from any source.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key from your Clerk dashboard."
            ),
        ));
    }

    Ok(())
}
