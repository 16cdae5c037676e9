//! Host-facing entry point: start, validate, stop.

use std::sync::Arc;

use roost_auth::CredentialValidator;
use roost_core::Identity;
use roost_settings::ClientSettings;
use tracing::{debug, error, info, instrument};

use crate::errors::RuntimeError;
use crate::orchestrator::{LifecycleOrchestrator, PollPolicy, StopOutcome};
use crate::registry::{ClientKey, HostContext};
use crate::subsystem::ClientFactory;

/// What the host runtime calls to manage the social client.
pub struct ClientFacade {
    factory: Arc<dyn ClientFactory>,
    validator: CredentialValidator,
    poll: Option<PollPolicy>,
}

impl ClientFacade {
    /// Facade building clients with `factory` and checking credentials with
    /// `validator`.
    pub fn new(factory: Arc<dyn ClientFactory>, validator: CredentialValidator) -> Self {
        Self {
            factory,
            validator,
            poll: None,
        }
    }

    /// Override the poll policy derived from settings.
    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = Some(poll);
        self
    }

    /// Validate `settings`, build an orchestrator and launch its startup
    /// task. Returns without waiting for the session.
    ///
    /// The caller registers the returned handle with its registry if it
    /// wants [`stop`](Self::stop) to find it.
    #[instrument(skip_all, fields(username = %settings.identity.username))]
    pub fn start(
        &self,
        settings: ClientSettings,
    ) -> Result<Arc<LifecycleOrchestrator>, RuntimeError> {
        if let Err(e) = settings.validate() {
            error!(
                username = %settings.identity.username,
                email = %settings.identity.email,
                error = %e,
                "client configuration invalid, not starting"
            );
            return Err(e.into());
        }

        info!(
            search = settings.search_enabled,
            spaces = settings.spaces_enabled,
            dry_run = settings.dry_run,
            "starting client"
        );

        let poll = self
            .poll
            .unwrap_or_else(|| PollPolicy::from_settings(&settings));
        let orchestrator = Arc::new(LifecycleOrchestrator::new(
            settings,
            self.factory.as_ref(),
            poll,
        ));
        let _startup = orchestrator.launch()?;
        Ok(orchestrator)
    }

    /// `true` iff a fresh login with `identity` succeeds.
    pub async fn validate(&self, identity: &Identity) -> bool {
        self.validator.validate(identity).await
    }

    /// Validate the identity in `settings`, caching session cookies under
    /// `settings.cache_namespace`.
    pub async fn validate_settings(&self, settings: &ClientSettings) -> bool {
        self.validator
            .validate_in(&settings.identity, &settings.cache_namespace)
            .await
    }

    /// Stop the agent's registered client, if there is one.
    ///
    /// Returns `None` when the registry has no client for the agent.
    #[instrument(skip_all, fields(agent_id = %host.agent_id))]
    pub async fn stop(&self, host: &HostContext) -> Option<StopOutcome> {
        info!(agent_name = %host.agent_name, "stopping client");

        let key = ClientKey::twitter(host.agent_id.clone());
        let Some(orchestrator) = host.registry.get(&key) else {
            debug!("no client registered for agent");
            return None;
        };
        Some(orchestrator.stop().await)
    }

    /// Stop a client the host holds directly.
    pub async fn stop_client(&self, orchestrator: &Arc<LifecycleOrchestrator>) -> StopOutcome {
        orchestrator.stop().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::LifecycleState;
    use crate::registry::ClientRegistry;
    use crate::subsystem::SubsystemKind;
    use crate::testutil::{CountingProbe, FakeFactory, Recorder};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use roost_auth::{
        AuthError, LoginClient, LoginClientFactory, MemoryArtifactCache, SessionArtifact,
        load_session_artifact,
    };
    use roost_core::AgentId;
    use roost_core::logging::capture_logs;
    use roost_settings::{SettingsError, apply_overrides_with};
    use tracing::Level;

    /// Accepts exactly one password.
    struct FixedPasswordClient {
        password: &'static str,
        logged_in: parking_lot::Mutex<bool>,
    }

    #[async_trait]
    impl LoginClient for FixedPasswordClient {
        async fn login(&self, identity: &Identity) -> Result<(), AuthError> {
            *self.logged_in.lock() = identity.password == self.password;
            Ok(())
        }

        async fn is_logged_in(&self) -> Result<bool, AuthError> {
            Ok(*self.logged_in.lock())
        }

        async fn session_artifact(&self) -> Result<SessionArtifact, AuthError> {
            Ok(SessionArtifact::new(Vec::new()))
        }
    }

    struct FixedPasswordFactory;

    impl LoginClientFactory for FixedPasswordFactory {
        fn create(&self, _username: &str) -> Result<Box<dyn LoginClient>, AuthError> {
            Ok(Box::new(FixedPasswordClient {
                password: "correct",
                logged_in: parking_lot::Mutex::new(false),
            }))
        }
    }

    fn settings(password: &str) -> ClientSettings {
        ClientSettings::with_identity(Identity::new("alice", password, "alice@example.com"))
    }

    fn facade(probe: CountingProbe) -> (ClientFacade, Arc<Recorder>, Arc<MemoryArtifactCache>) {
        let recorder = Recorder::new(probe);
        let cache = Arc::new(MemoryArtifactCache::new());
        let validator = CredentialValidator::new(Arc::new(FixedPasswordFactory), "twitter")
            .with_cache(cache.clone());
        let facade = ClientFacade::new(Arc::new(FakeFactory::new(recorder.clone())), validator);
        (facade, recorder, cache)
    }

    #[test]
    fn invalid_settings_rejected_and_logged() {
        let (logs, _guard) = capture_logs();
        let (facade, recorder, _) = facade(CountingProbe::never());

        let result = facade.start(settings(""));

        assert_matches!(
            result,
            Err(RuntimeError::Config(SettingsError::MissingField(_)))
        );
        let events = logs.events();
        let rejected = events
            .iter()
            .find(|e| e.level == Level::ERROR)
            .expect("error event");
        assert_eq!(rejected.field("username"), Some("alice"));
        assert_eq!(rejected.field("email"), Some("alice@example.com"));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn password_never_logged_on_rejection() {
        let (logs, _guard) = capture_logs();
        let (facade, _, _) = facade(CountingProbe::never());
        let mut bad = settings("s3cret-pass");
        bad.identity.email = "not-an-email".into();

        assert!(facade.start(bad).is_err());
        assert!(!logs.any_field_contains("s3cret-pass"));
    }

    #[test]
    fn start_outside_runtime_fails() {
        let (facade, _, _) = facade(CountingProbe::never());
        assert_matches!(facade.start(settings("pw")), Err(RuntimeError::NoRuntime));
    }

    #[tokio::test(start_paused = true)]
    async fn start_returns_before_session_exists() {
        let (facade, recorder, _) = facade(CountingProbe::never());

        let orchestrator = facade.start(settings("pw")).unwrap();

        assert_eq!(orchestrator.state(), LifecycleState::AwaitingSession);
        assert!(recorder.calls().is_empty());
        orchestrator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn start_honours_poll_override() {
        let (facade, recorder, _) = facade(CountingProbe::never());
        let facade = facade.with_poll_policy(PollPolicy::default().with_max_polls(2));

        let orchestrator = facade.start(settings("pw")).unwrap();
        let mut states = orchestrator.subscribe_state();
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;

        assert_eq!(recorder.probe.polls(), 2);
        assert_eq!(*states.borrow_and_update(), LifecycleState::AwaitingSession);
    }

    #[tokio::test]
    async fn validate_delegates_and_caches_on_success() {
        let (facade, _, cache) = facade(CountingProbe::never());

        assert!(!facade.validate(&Identity::new("alice", "wrong", "a@b.c")).await);
        assert!(cache.is_empty());

        assert!(facade.validate(&Identity::new("alice", "correct", "a@b.c")).await);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn validate_settings_caches_under_configured_namespace() {
        let (facade, _, cache) = facade(CountingProbe::never());
        let mut settings = settings("correct");
        apply_overrides_with(&mut settings, |name| {
            (name == "TWITTER_CACHE_NAMESPACE").then(|| "custom".to_string())
        });
        assert_eq!(settings.cache_namespace, "custom");

        assert!(facade.validate_settings(&settings).await);

        assert!(
            load_session_artifact(cache.as_ref(), "custom", "alice")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            load_session_artifact(cache.as_ref(), "twitter", "alice")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn stop_with_unregistered_agent_is_silent() {
        let (logs, _guard) = capture_logs();
        let (facade, _, _) = facade(CountingProbe::never());
        let host = HostContext::new(
            AgentId::from("agent-1"),
            "Roosty",
            Arc::new(ClientRegistry::new()),
        );

        assert_eq!(facade.stop(&host).await, None);
        let notice = logs
            .events()
            .into_iter()
            .find(|e| e.message.contains("stopping client"))
            .expect("stop notice");
        assert_eq!(notice.field("agent_name"), Some("Roosty"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_finds_registered_client() {
        let (facade, recorder, _) = facade(CountingProbe::ready_after(1));
        let registry = Arc::new(ClientRegistry::new());
        let agent = AgentId::from("agent-1");

        let orchestrator = facade.start(settings("pw")).unwrap();
        let _ = registry.register(ClientKey::twitter(agent.clone()), orchestrator.clone());
        let mut states = orchestrator.subscribe_state();
        let _ = states
            .wait_for(|state| *state == LifecycleState::Running)
            .await
            .unwrap();

        let host = HostContext::new(agent, "Roosty", registry);
        assert_eq!(facade.stop(&host).await, Some(StopOutcome::Stopped));
        assert_eq!(
            recorder.stops(),
            vec![SubsystemKind::Post, SubsystemKind::Interaction]
        );
        assert_eq!(facade.stop(&host).await, Some(StopOutcome::AlreadyStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_client_before_session_is_noop() {
        let (facade, recorder, _) = facade(CountingProbe::never());
        let orchestrator = facade.start(settings("pw")).unwrap();

        assert_eq!(
            facade.stop_client(&orchestrator).await,
            StopOutcome::StillStarting
        );
        assert!(recorder.stops().is_empty());

        recorder.probe.force_ready();
        let mut states = orchestrator.subscribe_state();
        let _ = states
            .wait_for(|state| *state == LifecycleState::Running)
            .await
            .unwrap();
        assert_eq!(
            recorder.starts(),
            vec![SubsystemKind::Post, SubsystemKind::Interaction]
        );
    }
}
