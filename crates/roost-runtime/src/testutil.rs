//! Instrumented fakes shared by the orchestrator and facade tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use roost_auth::SessionProbe;
use roost_settings::ClientSettings;

use crate::subsystem::{BaseClient, ClientFactory, Subsystem, SubsystemError, SubsystemKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Init,
    Start(SubsystemKind),
    Stop(SubsystemKind),
}

/// A call plus the number of probe checks made before it.
#[derive(Clone, Copy, Debug)]
pub struct Recorded {
    pub call: Call,
    pub polls_seen: u32,
}

/// Probe that counts checks and reports ready from the `ready_after`th on.
#[derive(Default)]
pub struct CountingProbe {
    polls: AtomicU32,
    ready_after: Option<u32>,
    forced: AtomicBool,
}

impl CountingProbe {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn ready_after(checks: u32) -> Self {
        Self {
            ready_after: Some(checks),
            ..Self::default()
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn force_ready(&self) {
        self.forced.store(true, Ordering::SeqCst);
    }
}

impl SessionProbe for CountingProbe {
    fn is_ready(&self) -> bool {
        let checks = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        self.forced.load(Ordering::SeqCst) || self.ready_after.is_some_and(|after| checks >= after)
    }
}

/// Shared call log for one orchestrator's fakes.
pub struct Recorder {
    pub probe: Arc<CountingProbe>,
    calls: Mutex<Vec<Recorded>>,
    fail_init: AtomicBool,
    fail_start: Mutex<Option<SubsystemKind>>,
    fail_stop: Mutex<Option<SubsystemKind>>,
    slow_start: Mutex<Option<(SubsystemKind, Duration)>>,
}

impl Recorder {
    pub fn new(probe: CountingProbe) -> Arc<Self> {
        Arc::new(Self {
            probe: Arc::new(probe),
            calls: Mutex::new(Vec::new()),
            fail_init: AtomicBool::new(false),
            fail_start: Mutex::new(None),
            fail_stop: Mutex::new(None),
            slow_start: Mutex::new(None),
        })
    }

    fn record(&self, call: Call) {
        let polls_seen = self.probe.polls();
        self.calls.lock().push(Recorded { call, polls_seen });
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.calls.lock().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|r| r.call).collect()
    }

    pub fn starts(&self) -> Vec<SubsystemKind> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn stops(&self) -> Vec<SubsystemKind> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Stop(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn fail_init(&self) {
        self.fail_init.store(true, Ordering::SeqCst);
    }

    pub fn fail_start_of(&self, kind: SubsystemKind) {
        *self.fail_start.lock() = Some(kind);
    }

    pub fn fail_stop_of(&self, kind: SubsystemKind) {
        *self.fail_stop.lock() = Some(kind);
    }

    pub fn slow_start_of(&self, kind: SubsystemKind, delay: Duration) {
        *self.slow_start.lock() = Some((kind, delay));
    }
}

struct FakeBase {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl BaseClient for FakeBase {
    fn probe(&self) -> Arc<dyn SessionProbe> {
        self.recorder.probe.clone()
    }

    async fn init(&self) -> Result<(), SubsystemError> {
        self.recorder.record(Call::Init);
        if self.recorder.fail_init.load(Ordering::SeqCst) {
            return Err(SubsystemError::Failed("profile fetch failed".into()));
        }
        Ok(())
    }
}

struct FakeSubsystem {
    kind: SubsystemKind,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl Subsystem for FakeSubsystem {
    async fn start(&self) -> Result<(), SubsystemError> {
        self.recorder.record(Call::Start(self.kind));
        let slow = *self.recorder.slow_start.lock();
        if let Some((_, delay)) = slow.filter(|(kind, _)| *kind == self.kind) {
            tokio::time::sleep(delay).await;
        }
        if *self.recorder.fail_start.lock() == Some(self.kind) {
            return Err(SubsystemError::Failed(format!("{} refused to start", self.kind)));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), SubsystemError> {
        self.recorder.record(Call::Stop(self.kind));
        if *self.recorder.fail_stop.lock() == Some(self.kind) {
            return Err(SubsystemError::Failed(format!("{} refused to stop", self.kind)));
        }
        Ok(())
    }
}

pub struct FakeFactory {
    pub recorder: Arc<Recorder>,
}

impl FakeFactory {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

impl ClientFactory for FakeFactory {
    fn base(&self, _settings: &ClientSettings) -> Arc<dyn BaseClient> {
        Arc::new(FakeBase {
            recorder: self.recorder.clone(),
        })
    }

    fn subsystem(
        &self,
        kind: SubsystemKind,
        _base: &Arc<dyn BaseClient>,
        _settings: &ClientSettings,
    ) -> Arc<dyn Subsystem> {
        Arc::new(FakeSubsystem {
            kind,
            recorder: self.recorder.clone(),
        })
    }
}
