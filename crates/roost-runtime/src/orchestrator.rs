//! Session-gated lifecycle orchestrator.
//!
//! One orchestrator owns the base client and the subsystem set for a single
//! account. Startup runs on a detached task: it polls the session probe until
//! the base client has authenticated, then initialises the base client and
//! starts each subsystem in order. Stop runs its own cascade and only acts
//! once a session exists.
//!
//! ```text
//! Unstarted ─launch─▶ AwaitingSession ─ready─▶ Starting ─▶ Running ─stop─▶ Stopped
//!                                                  └──error──▶ Failed ─stop─▶ Stopped
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use roost_auth::SessionProbe;
use roost_core::OrchestratorId;
use roost_settings::{ClientSettings, DEFAULT_SESSION_POLL_INTERVAL_MS};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::RuntimeError;
use crate::subsystem::{BaseClient, ClientFactory, Subsystem, SubsystemKind};

/// Where an orchestrator is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Constructed, startup task not launched.
    Unstarted,
    /// Startup task is polling for the session.
    AwaitingSession,
    /// Session ready, start cascade in progress.
    Starting,
    /// Every subsystem started.
    Running,
    /// A start cascade step failed; later steps did not run.
    Failed,
    /// Stop cascade executed. Terminal.
    Stopped,
}

/// How the startup task waits for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between probe checks.
    pub interval: Duration,
    /// Give up after this many checks. `None` polls until cancelled.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    /// One check per second with no upper bound.
    ///
    /// A session that never appears keeps the startup task alive until
    /// [`LifecycleOrchestrator::shutdown`] is called.
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_SESSION_POLL_INTERVAL_MS),
            max_polls: None,
        }
    }
}

impl PollPolicy {
    /// Unbounded polling at the configured interval.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            interval: settings.session_poll_interval(),
            max_polls: None,
        }
    }

    /// Bound the number of probe checks.
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }
}

/// How the startup task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartupOutcome {
    /// All subsystems started.
    Running,
    /// A cascade step failed.
    Failed,
    /// `max_polls` reached without a session.
    PollsExhausted,
    /// Cancelled by `shutdown` or a completed stop.
    Cancelled,
}

/// What a call to [`LifecycleOrchestrator::stop`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The stop cascade ran.
    Stopped,
    /// No session yet; nothing was stopped.
    StillStarting,
    /// A previous call already ran the cascade.
    AlreadyStopped,
}

enum SessionWait {
    Ready,
    Exhausted,
    Cancelled,
}

/// Coordinates the base client and subsystems of one account.
pub struct LifecycleOrchestrator {
    id: OrchestratorId,
    settings: ClientSettings,
    base: Arc<dyn BaseClient>,
    probe: Arc<dyn SessionProbe>,
    post: Arc<dyn Subsystem>,
    interaction: Arc<dyn Subsystem>,
    search: Option<Arc<dyn Subsystem>>,
    space: Option<Arc<dyn Subsystem>>,
    poll: PollPolicy,
    state: watch::Sender<LifecycleState>,
    cancel: CancellationToken,
    launched: AtomicBool,
    /// Held for the whole start cascade and the whole stop cascade.
    transition: Mutex<()>,
}

impl LifecycleOrchestrator {
    /// Wire the base client and subsystems. Performs no I/O and starts nothing.
    pub fn new(settings: ClientSettings, factory: &dyn ClientFactory, poll: PollPolicy) -> Self {
        let id = OrchestratorId::new();
        let username = settings.identity.username.as_str();

        if settings.search_enabled {
            warn_search_risk(username);
        }
        if settings.dry_run {
            info!(orchestrator = %id, username, "dry run enabled, subsystems will not publish");
        }

        let base = factory.base(&settings);
        let probe = base.probe();
        let post = factory.subsystem(SubsystemKind::Post, &base, &settings);
        let interaction = factory.subsystem(SubsystemKind::Interaction, &base, &settings);
        let search = settings
            .search_enabled
            .then(|| factory.subsystem(SubsystemKind::Search, &base, &settings));
        let space = settings
            .spaces_enabled
            .then(|| factory.subsystem(SubsystemKind::Space, &base, &settings));

        let (state, _) = watch::channel(LifecycleState::Unstarted);

        debug!(
            orchestrator = %id,
            username,
            search = search.is_some(),
            space = space.is_some(),
            "orchestrator constructed"
        );

        Self {
            id,
            settings,
            base,
            probe,
            post,
            interaction,
            search,
            space,
            poll,
            state,
            cancel: CancellationToken::new(),
            launched: AtomicBool::new(false),
            transition: Mutex::new(()),
        }
    }

    /// Spawn the startup task and return immediately.
    ///
    /// The task polls for the session and then runs the start cascade. Can
    /// be called once per orchestrator.
    pub fn launch(self: &Arc<Self>) -> Result<JoinHandle<StartupOutcome>, RuntimeError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?;
        if self.launched.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyLaunched);
        }

        let _ = self.state.send_if_modified(|state| {
            if *state == LifecycleState::Unstarted {
                *state = LifecycleState::AwaitingSession;
                true
            } else {
                false
            }
        });

        let this = Arc::clone(self);
        Ok(runtime.spawn(async move { this.run_startup().await }))
    }

    #[instrument(skip(self), fields(orchestrator = %self.id, username = %self.settings.identity.username))]
    async fn run_startup(&self) -> StartupOutcome {
        match self.await_session().await {
            SessionWait::Ready => {}
            SessionWait::Exhausted => return StartupOutcome::PollsExhausted,
            SessionWait::Cancelled => {
                debug!("startup cancelled before the session was ready");
                return StartupOutcome::Cancelled;
            }
        }

        let _transition = self.transition.lock().await;
        if self.cancel.is_cancelled() || self.state() == LifecycleState::Stopped {
            debug!("client stopped before startup could begin");
            return StartupOutcome::Cancelled;
        }

        self.set_state(LifecycleState::Starting);
        match self.start_cascade().await {
            Ok(()) => {
                self.set_state(LifecycleState::Running);
                info!(subsystems = ?self.subsystems(), "client running");
                StartupOutcome::Running
            }
            Err(error) => {
                error!(%error, "client startup failed");
                self.set_state(LifecycleState::Failed);
                StartupOutcome::Failed
            }
        }
    }

    async fn await_session(&self) -> SessionWait {
        let mut polls: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return SessionWait::Cancelled;
            }

            polls = polls.saturating_add(1);
            if self.probe.is_ready() {
                debug!(polls, "session ready");
                return SessionWait::Ready;
            }
            if self.poll.max_polls.is_some_and(|max| polls >= max) {
                warn!(polls, "session never became ready, giving up");
                return SessionWait::Exhausted;
            }

            debug!(polls, "session not ready, retrying");
            tokio::select! {
                () = self.cancel.cancelled() => return SessionWait::Cancelled,
                () = tokio::time::sleep(self.poll.interval) => {}
            }
        }
    }

    async fn start_cascade(&self) -> Result<(), RuntimeError> {
        self.base.init().await.map_err(RuntimeError::BaseInit)?;

        for (kind, subsystem) in self.start_order() {
            debug!(subsystem = %kind, "starting subsystem");
            subsystem
                .start()
                .await
                .map_err(|source| RuntimeError::Subsystem { kind, source })?;
            info!(subsystem = %kind, "subsystem started");
        }
        Ok(())
    }

    /// Run the stop cascade if a session exists.
    ///
    /// Order is post, interaction, then search. The space subsystem is only
    /// stopped when `stop_spaces_on_shutdown` is set. A failing step is
    /// logged and the cascade continues. After a completed stop the startup
    /// task is cancelled and further calls are no-ops.
    #[instrument(skip(self), fields(orchestrator = %self.id))]
    pub async fn stop(&self) -> StopOutcome {
        let _transition = self.transition.lock().await;

        if self.state() == LifecycleState::Stopped {
            debug!("client already stopped");
            return StopOutcome::AlreadyStopped;
        }
        if !self.probe.is_ready() {
            info!("client still starting up, nothing to stop");
            return StopOutcome::StillStarting;
        }

        self.cancel.cancel();
        for (kind, subsystem) in self.stop_order() {
            match subsystem.stop().await {
                Ok(()) => debug!(subsystem = %kind, "subsystem stopped"),
                Err(error) => error!(subsystem = %kind, %error, "subsystem failed to stop"),
            }
        }
        if self.space.is_some() && !self.settings.stop_spaces_on_shutdown {
            debug!("space subsystem left running");
        }

        self.set_state(LifecycleState::Stopped);
        info!("client stopped");
        StopOutcome::Stopped
    }

    /// Cancel the startup task. Subsystems that already started keep running.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Orchestrator identifier, used in log fields.
    pub fn id(&self) -> &OrchestratorId {
        &self.id
    }

    /// Settings this orchestrator was built from.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Whether the search subsystem was constructed.
    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Whether the space subsystem was constructed.
    pub fn has_space(&self) -> bool {
        self.space.is_some()
    }

    /// Constructed subsystems, in start order.
    pub fn subsystems(&self) -> Vec<SubsystemKind> {
        self.start_order().into_iter().map(|(kind, _)| kind).collect()
    }

    fn start_order(&self) -> Vec<(SubsystemKind, &Arc<dyn Subsystem>)> {
        let mut order = vec![(SubsystemKind::Post, &self.post)];
        if let Some(search) = &self.search {
            order.push((SubsystemKind::Search, search));
        }
        order.push((SubsystemKind::Interaction, &self.interaction));
        if let Some(space) = &self.space {
            order.push((SubsystemKind::Space, space));
        }
        order
    }

    fn stop_order(&self) -> Vec<(SubsystemKind, &Arc<dyn Subsystem>)> {
        let mut order = vec![
            (SubsystemKind::Post, &self.post),
            (SubsystemKind::Interaction, &self.interaction),
        ];
        if let Some(search) = &self.search {
            order.push((SubsystemKind::Search, search));
        }
        if let Some(space) = self.space.as_ref().filter(|_| self.settings.stop_spaces_on_shutdown) {
            order.push((SubsystemKind::Space, space));
        }
        order
    }

    fn set_state(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = ?previous, to = ?next, "lifecycle transition");
        }
    }
}

impl std::fmt::Debug for LifecycleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleOrchestrator")
            .field("id", &self.id)
            .field("username", &self.settings.identity.username)
            .field("state", &self.state())
            .field("subsystems", &self.subsystems())
            .finish_non_exhaustive()
    }
}

fn warn_search_risk(username: &str) {
    warn!(username, "search is enabled for this account");
    warn!("automated search engagement can breach the service's terms of use");
    warn!("the account may be restricted or suspended, only enable search if you accept that");
}
