//! User sync: provider profile in, backend token cookie out.

use tower_cookies::Cookies;
use tracing::{error, info};
use xano_bridge_core::{BackendUserPayload, ProviderUser, SyncResult};

use super::XanoClient;
use crate::cookie::TokenCookieStore;

/// Sync a user with Xano and store the returned token in the cookie jar.
///
/// Never fails: errors are logged and reported through [`SyncResult`]. The
/// cookie is only written when a non-empty token came back.
pub async fn sync_user(
    xano: &XanoClient,
    store: &TokenCookieStore,
    cookies: &Cookies,
    user: &ProviderUser,
) -> SyncResult {
    let payload = BackendUserPayload::from_provider_user(user, store.max_age_secs());

    match xano.request_token(&payload).await {
        Ok(token) => {
            store.set(cookies, &token);
            info!(user_id = %user.id, "User synced with Xano");
            SyncResult::succeeded()
        }
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Xano sync failed after retries");
            SyncResult::failed(e)
        }
    }
}
