//! Serialised session artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One browser-style cookie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie is scoped to.
    pub domain: String,
    /// Path the cookie is scoped to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiry as a unix timestamp in seconds, if persistent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

fn default_path() -> String {
    "/".to_string()
}

/// Cookies captured after a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionArtifact {
    /// Captured cookies.
    pub cookies: Vec<Cookie>,
    /// Capture time.
    pub captured_at: DateTime<Utc>,
}

impl SessionArtifact {
    /// Artifact captured now.
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self {
            cookies,
            captured_at: Utc::now(),
        }
    }

    /// Whether any cookie with an expiry has passed it at `now`.
    pub fn has_expired_cookie(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.cookies
            .iter()
            .any(|c| c.expires.is_some_and(|exp| exp <= now))
    }
}
