//! # roost-core
//!
//! Foundation types shared by every Roost crate.
//!
//! - **Branded IDs**: [`ids::AgentId`], [`ids::OrchestratorId`] as newtypes
//! - **Identity**: [`identity::Identity`], the credential tuple for one account
//! - **Logging**: [`logging::init_subscriber`] and in-memory capture for tests
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `roost-settings`, `roost-auth` and
//! `roost-runtime`.

#![deny(unsafe_code)]

pub mod identity;
pub mod ids;
pub mod logging;

pub use identity::Identity;
pub use ids::{AgentId, OrchestratorId};
