//! Trait boundary to the remote service's login flow.
//!
//! Scraping and network mechanics live behind these traits; this crate only
//! drives them.

use async_trait::async_trait;
use roost_core::Identity;

use crate::artifact::SessionArtifact;
use crate::errors::AuthError;

/// An unauthenticated (until [`login`](LoginClient::login)) client for one
/// account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginClient: Send + Sync {
    /// Attempt to log in with the full identity tuple.
    async fn login(&self, identity: &Identity) -> Result<(), AuthError>;

    /// Whether the client currently holds an authenticated session.
    async fn is_logged_in(&self) -> Result<bool, AuthError>;

    /// Export the session cookies for caching.
    async fn session_artifact(&self) -> Result<SessionArtifact, AuthError>;
}

/// Creates fresh login clients scoped to a username.
#[cfg_attr(test, mockall::automock)]
pub trait LoginClientFactory: Send + Sync {
    /// New client with no session state.
    fn create(&self, username: &str) -> Result<Box<dyn LoginClient>, AuthError>;
}
