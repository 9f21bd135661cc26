//! Post-sync redirect validation.

use url::Url;

/// Where a successful sync lands when no valid target was requested.
pub const DEFAULT_SYNC_REDIRECT: &str = "/app/dashboard";

/// Resolve a requested redirect against the app's base URL.
///
/// Relative targets are resolved against `base_url`. The result is only
/// accepted when it has the same origin as `base_url`; anything else yields
/// [`DEFAULT_SYNC_REDIRECT`].
#[must_use]
pub fn safe_redirect_target(base_url: &str, requested: Option<&str>) -> String {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return DEFAULT_SYNC_REDIRECT.to_string();
    };

    let Ok(base) = Url::parse(base_url) else {
        return DEFAULT_SYNC_REDIRECT.to_string();
    };

    match base.join(requested) {
        Ok(target) if target.origin() == base.origin() => target.to_string(),
        Ok(target) => {
            tracing::warn!(target = %target, "Rejected cross-origin sync redirect");
            DEFAULT_SYNC_REDIRECT.to_string()
        }
        Err(_) => DEFAULT_SYNC_REDIRECT.to_string(),
    }
}
