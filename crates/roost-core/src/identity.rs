//! Account identity used for login and cache keying.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials for one remote account.
///
/// `Debug` never prints the password or the two-factor secret, so an
/// `Identity` can be logged with `?identity` safely.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    /// Account handle (without the leading `@`).
    pub username: String,
    /// Account password.
    pub password: String,
    /// Email address registered to the account.
    pub email: String,
    /// TOTP secret for accounts with two-factor auth enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_secret: Option<String>,
}

impl Identity {
    /// Build an identity without a two-factor secret.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            two_factor_secret: None,
        }
    }

    /// Attach a two-factor secret.
    #[must_use]
    pub fn with_two_factor_secret(mut self, secret: impl Into<String>) -> Self {
        self.two_factor_secret = Some(secret.into());
        self
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field(
                "two_factor_secret",
                &self.two_factor_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
