//! One-shot credential validation.

use std::sync::Arc;

use roost_core::Identity;
use tracing::{info, instrument, warn};

use crate::cache::{ArtifactCache, cookie_cache_key, save_session_artifact};
use crate::errors::AuthError;
use crate::login::LoginClientFactory;

/// Validates credentials with a fresh login and caches the resulting
/// session artifact.
///
/// Caching only happens when a cache is attached with
/// [`with_cache`](Self::with_cache). Validation never returns an error: every
/// failure is logged and reported as `false`.
pub struct CredentialValidator {
    clients: Arc<dyn LoginClientFactory>,
    cache: Option<Arc<dyn ArtifactCache>>,
    namespace: String,
}

impl CredentialValidator {
    /// Validator without a cache. `namespace` prefixes cache keys.
    pub fn new(clients: Arc<dyn LoginClientFactory>, namespace: impl Into<String>) -> Self {
        Self {
            clients,
            cache: None,
            namespace: namespace.into(),
        }
    }

    /// Attach the cache that successful logins are written to.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ArtifactCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// `true` iff a fresh login with `identity` succeeds. Cookies are cached
    /// under the validator's own namespace.
    pub async fn validate(&self, identity: &Identity) -> bool {
        self.validate_in(identity, &self.namespace).await
    }

    /// Like [`validate`](Self::validate), caching cookies under `namespace`.
    #[instrument(skip_all, fields(username = %identity.username, namespace = %namespace))]
    pub async fn validate_in(&self, identity: &Identity, namespace: &str) -> bool {
        match self.try_validate(identity, namespace).await {
            Ok(logged_in) => logged_in,
            Err(e) => {
                warn!(error = %e, "credential validation failed");
                false
            }
        }
    }

    async fn try_validate(&self, identity: &Identity, namespace: &str) -> Result<bool, AuthError> {
        let client = self.clients.create(&identity.username)?;
        client.login(identity).await?;
        if !client.is_logged_in().await? {
            info!("login did not produce a session");
            return Ok(false);
        }

        if let Some(cache) = &self.cache {
            let artifact = client.session_artifact().await?;
            let key = cookie_cache_key(namespace, &identity.username);
            let saved =
                save_session_artifact(cache.as_ref(), namespace, &identity.username, &artifact)
                    .await;
            match saved {
                Ok(()) => info!(
                    %key,
                    cookies = artifact.cookies.len(),
                    "login succeeded, session cookies cached"
                ),
                Err(e) => warn!(%key, error = %e, "login succeeded but caching cookies failed"),
            }
        }

        Ok(true)
    }
}
