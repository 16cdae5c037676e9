//! Session holder and readiness probe.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Opaque proof that an authenticated session exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHandle {
    username: String,
    established_at: DateTime<Utc>,
}

impl SessionHandle {
    /// Handle for a session established now.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            established_at: Utc::now(),
        }
    }

    /// Account the session belongs to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// When the session was established.
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

/// Shared cell holding the current session, if any.
///
/// Clones share the same cell. Only the base client writes to it; everyone
/// else reads through [`SessionProbe`]. Once established the session is
/// never cleared by the orchestrator.
#[derive(Clone, Debug, Default)]
pub struct SessionHolder {
    inner: Arc<RwLock<Option<SessionHandle>>>,
}

impl SessionHolder {
    /// Empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly established session, replacing any previous one.
    pub fn establish(&self, handle: SessionHandle) {
        tracing::debug!(username = handle.username(), "session established");
        *self.inner.write() = Some(handle);
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Option<SessionHandle> {
        self.inner.read().clone()
    }

    /// Whether a session is present.
    pub fn is_established(&self) -> bool {
        self.inner.read().is_some()
    }
}

/// Read-only readiness query over a session holder.
///
/// Side-effect free and valid at every lifecycle stage, including before the
/// base client has attempted to authenticate.
pub trait SessionProbe: Send + Sync {
    /// Whether an authenticated session currently exists.
    fn is_ready(&self) -> bool;
}

impl SessionProbe for SessionHolder {
    fn is_ready(&self) -> bool {
        self.is_established()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_holder_is_not_ready() {
        let holder = SessionHolder::new();
        assert!(!holder.is_ready());
        assert!(holder.current().is_none());
    }

    #[test]
    fn clones_share_state() {
        let holder = SessionHolder::new();
        let probe: Arc<dyn SessionProbe> = Arc::new(holder.clone());
        assert!(!probe.is_ready());

        holder.establish(SessionHandle::new("alice"));
        assert!(probe.is_ready());
        assert_eq!(holder.current().unwrap().username(), "alice");
    }

    #[test]
    fn probing_has_no_side_effects() {
        let holder = SessionHolder::new();
        for _ in 0..3 {
            assert!(!holder.is_ready());
        }
        assert!(holder.current().is_none());
    }
}
