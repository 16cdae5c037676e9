//! Contracts between the orchestrator and the subsystems it manages.
//!
//! The orchestrator never looks inside a subsystem. It only calls
//! [`Subsystem::start`] and [`Subsystem::stop`] in a fixed order, and reads
//! the session through the base client's probe.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use roost_auth::{AuthError, SessionProbe};
use roost_settings::ClientSettings;
use serde::Serialize;

/// The managed subsystems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsystemKind {
    /// Scheduled posting. Always present.
    Post,
    /// Search-driven engagement. Present iff search is enabled.
    Search,
    /// Mentions and replies. Always present.
    Interaction,
    /// Audio spaces. Present iff spaces are enabled.
    Space,
}

impl SubsystemKind {
    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Search => "search",
            Self::Interaction => "interaction",
            Self::Space => "space",
        }
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a subsystem or the base client.
#[derive(Debug, thiserror::Error)]
pub enum SubsystemError {
    /// The subsystem could not complete the operation.
    #[error("{0}")]
    Failed(String),
    /// The operation needed the session and the session layer failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A managed unit with an idempotent lifecycle.
///
/// Both methods must tolerate repeated calls. `stop` must succeed as a no-op
/// when `start` was never called.
#[async_trait]
pub trait Subsystem: Send + Sync {
    /// Start the subsystem. Returns once it is running.
    async fn start(&self) -> Result<(), SubsystemError>;

    /// Stop the subsystem. Returns once it has stopped.
    async fn stop(&self) -> Result<(), SubsystemError>;
}

/// The client that owns the authenticated session.
///
/// It establishes the session on its own (cached cookies or a fresh login);
/// the orchestrator only observes it through [`probe`](Self::probe).
#[async_trait]
pub trait BaseClient: Send + Sync {
    /// Read-only view of the session holder.
    fn probe(&self) -> Arc<dyn SessionProbe>;

    /// Session-dependent initialisation (profile, timeline cache) run once
    /// the session exists and before any subsystem starts.
    async fn init(&self) -> Result<(), SubsystemError>;
}

/// Builds the base client and subsystems for one orchestrator.
///
/// Implementations must not perform network I/O here; construction is
/// synchronous wiring only.
pub trait ClientFactory: Send + Sync {
    /// The base client for `settings.identity`.
    fn base(&self, settings: &ClientSettings) -> Arc<dyn BaseClient>;

    /// The subsystem of `kind`, sharing `base`.
    fn subsystem(
        &self,
        kind: SubsystemKind,
        base: &Arc<dyn BaseClient>,
        settings: &ClientSettings,
    ) -> Arc<dyn Subsystem>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&SubsystemKind::Interaction).unwrap();
        assert_eq!(json, "\"interaction\"");
        assert_eq!(SubsystemKind::Space.to_string(), "space");
    }
}
