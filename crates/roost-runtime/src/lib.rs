//! # roost-runtime
//!
//! Session-gated lifecycle orchestration for the social client.
//!
//! - **Subsystems**: [`Subsystem`] is the start/stop contract every managed
//!   unit (post, search, interaction, space) implements
//! - **Base client**: [`BaseClient`] owns the session holder and exposes it
//!   read-only through a [`SessionProbe`](roost_auth::SessionProbe)
//! - **Orchestrator**: [`LifecycleOrchestrator`] polls for the session, then
//!   runs the start cascade; stop runs the (different) stop cascade
//! - **Facade**: [`ClientFacade`] is the host-facing entry point
//!   (`start` / `validate` / `stop`)
//! - **Registry**: [`ClientRegistry`] maps `(agent, client kind)` to a live
//!   orchestrator for hosts that look clients up later
//!
//! ## Crate Position
//!
//! Top of the stack. Depends on: roost-core, roost-settings, roost-auth.

#![deny(unsafe_code)]

pub mod errors;
pub mod facade;
pub mod orchestrator;
pub mod registry;
pub mod subsystem;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::RuntimeError;
pub use facade::ClientFacade;
pub use orchestrator::{
    LifecycleOrchestrator, LifecycleState, PollPolicy, StartupOutcome, StopOutcome,
};
pub use registry::{CLIENT_KIND, ClientKey, ClientRegistry, HostContext};
pub use subsystem::{BaseClient, ClientFactory, Subsystem, SubsystemError, SubsystemKind};
