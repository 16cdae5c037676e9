//! Runtime error types.

use roost_settings::SettingsError;

use crate::subsystem::{SubsystemError, SubsystemKind};

/// Errors from building or driving an orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Settings failed semantic validation; nothing was constructed.
    #[error("invalid client configuration: {0}")]
    Config(#[from] SettingsError),

    /// The base client's session initialisation failed.
    #[error("base client initialisation failed: {0}")]
    BaseInit(#[source] SubsystemError),

    /// A subsystem failed to start; later cascade steps did not run.
    #[error("{kind} subsystem failed to start: {source}")]
    Subsystem {
        /// Which subsystem failed.
        kind: SubsystemKind,
        /// Underlying failure.
        #[source]
        source: SubsystemError,
    },

    /// The startup task was already launched for this orchestrator.
    #[error("startup already launched")]
    AlreadyLaunched,

    /// No tokio runtime is available to run the startup task.
    #[error("no tokio runtime available to run client startup")]
    NoRuntime,
}
