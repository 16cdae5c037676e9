//! Host-owned lookup of live orchestrators.

use std::sync::Arc;

use dashmap::DashMap;
use roost_core::AgentId;

use crate::orchestrator::LifecycleOrchestrator;

/// Client kind under which the social client registers.
pub const CLIENT_KIND: &str = "twitter";

/// Registry key: one client of a given kind per agent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientKey {
    /// Owning agent.
    pub agent_id: AgentId,
    /// Client kind, e.g. [`CLIENT_KIND`].
    pub client_kind: String,
}

impl ClientKey {
    /// Key for `agent_id`'s client of `client_kind`.
    pub fn new(agent_id: AgentId, client_kind: impl Into<String>) -> Self {
        Self {
            agent_id,
            client_kind: client_kind.into(),
        }
    }

    /// Key for `agent_id`'s social client.
    pub fn twitter(agent_id: AgentId) -> Self {
        Self::new(agent_id, CLIENT_KIND)
    }
}

/// Concurrent map from [`ClientKey`] to a running orchestrator.
///
/// The host registers orchestrators after `start`; orchestrators never
/// register themselves.
#[derive(Default)]
pub struct ClientRegistry {
    clients: DashMap<ClientKey, Arc<LifecycleOrchestrator>>,
}

impl ClientRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `orchestrator`, returning the one it replaced.
    pub fn register(
        &self,
        key: ClientKey,
        orchestrator: Arc<LifecycleOrchestrator>,
    ) -> Option<Arc<LifecycleOrchestrator>> {
        self.clients.insert(key, orchestrator)
    }

    /// Look up the orchestrator for `key`.
    pub fn get(&self, key: &ClientKey) -> Option<Arc<LifecycleOrchestrator>> {
        self.clients.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove and return the orchestrator for `key`.
    pub fn remove(&self, key: &ClientKey) -> Option<Arc<LifecycleOrchestrator>> {
        self.clients.remove(key).map(|(_, orchestrator)| orchestrator)
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// What the host passes to `stop`: which agent, and where its clients live.
#[derive(Clone)]
pub struct HostContext {
    /// Agent whose client should stop.
    pub agent_id: AgentId,
    /// Display name, for logs.
    pub agent_name: String,
    /// The host's client registry.
    pub registry: Arc<ClientRegistry>,
}

impl HostContext {
    /// Context for `agent_id` backed by `registry`.
    pub fn new(
        agent_id: AgentId,
        agent_name: impl Into<String>,
        registry: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            agent_id,
            agent_name: agent_name.into(),
            registry,
        }
    }
}
