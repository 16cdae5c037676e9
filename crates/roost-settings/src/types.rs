//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every type implements [`Default`]
//! with production values and deserializes with `#[serde(default)]`, so a
//! settings file only needs the fields it overrides.

use std::time::Duration;

use roost_core::Identity;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Default delay between session readiness checks.
pub const DEFAULT_SESSION_POLL_INTERVAL_MS: u64 = 1_000;
/// Lower bound accepted for the readiness poll interval.
pub const MIN_SESSION_POLL_INTERVAL_MS: u64 = 100;
/// Upper bound accepted for the readiness poll interval.
pub const MAX_SESSION_POLL_INTERVAL_MS: u64 = 60_000;
/// Default namespace prefix for session artifact cache keys.
pub const DEFAULT_CACHE_NAMESPACE: &str = "twitter";

/// Root settings for one client instance.
///
/// Resolved once and never mutated after the orchestrator is constructed.
///
/// # JSON Format
///
/// ```json
/// {
///   "searchEnabled": true,
///   "identity": { "username": "alice", "password": "…", "email": "a@x.io" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Enables the search subsystem (`TWITTER_SEARCH_ENABLE`).
    pub search_enabled: bool,
    /// Enables the space subsystem (`TWITTER_SPACES_ENABLE`).
    pub spaces_enabled: bool,
    /// Subsystems log what they would do instead of doing it.
    pub dry_run: bool,
    /// Delay between session readiness checks, in milliseconds.
    pub session_poll_interval_ms: u64,
    /// Also stop the space subsystem during shutdown.
    ///
    /// Off by default: the shutdown cascade historically leaves the space
    /// subsystem running.
    pub stop_spaces_on_shutdown: bool,
    /// Prefix of session artifact cache keys (`<namespace>/<user>/cookies`).
    pub cache_namespace: String,
    /// Account credentials.
    pub identity: Identity,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            search_enabled: false,
            spaces_enabled: false,
            dry_run: false,
            session_poll_interval_ms: DEFAULT_SESSION_POLL_INTERVAL_MS,
            stop_spaces_on_shutdown: false,
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            identity: Identity::default(),
        }
    }
}

impl ClientSettings {
    /// Settings with defaults and the given identity.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    /// Readiness poll interval as a [`Duration`].
    pub fn session_poll_interval(&self) -> Duration {
        Duration::from_millis(self.session_poll_interval_ms)
    }

    /// Semantic validation, run before any orchestrator is constructed.
    ///
    /// Checks required identity fields and value ranges. The two-factor
    /// secret stays optional.
    pub fn validate(&self) -> Result<()> {
        let id = &self.identity;
        if id.username.trim().is_empty() {
            return Err(SettingsError::MissingField("TWITTER_USERNAME"));
        }
        if id.username.starts_with('@') {
            return Err(SettingsError::InvalidValue {
                field: "TWITTER_USERNAME",
                reason: "must not include the leading '@'".into(),
            });
        }
        if id.password.is_empty() {
            return Err(SettingsError::MissingField("TWITTER_PASSWORD"));
        }
        if id.email.trim().is_empty() {
            return Err(SettingsError::MissingField("TWITTER_EMAIL"));
        }
        if !looks_like_email(&id.email) {
            return Err(SettingsError::InvalidValue {
                field: "TWITTER_EMAIL",
                reason: "not an email address".into(),
            });
        }
        if !(MIN_SESSION_POLL_INTERVAL_MS..=MAX_SESSION_POLL_INTERVAL_MS)
            .contains(&self.session_poll_interval_ms)
        {
            return Err(SettingsError::InvalidValue {
                field: "TWITTER_SESSION_POLL_INTERVAL_MS",
                reason: format!(
                    "{} is outside {MIN_SESSION_POLL_INTERVAL_MS}..={MAX_SESSION_POLL_INTERVAL_MS}",
                    self.session_poll_interval_ms
                ),
            });
        }
        if self.cache_namespace.is_empty() || self.cache_namespace.contains('/') {
            return Err(SettingsError::InvalidValue {
                field: "TWITTER_CACHE_NAMESPACE",
                reason: "must be a non-empty single path segment".into(),
            });
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
