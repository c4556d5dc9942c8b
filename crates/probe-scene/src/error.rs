//! Error types for host-side operations.

use probe_core::InstanceId;

use crate::SceneHandle;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown {kind} '{value}'")]
    UnknownFilter { kind: &'static str, value: String },

    #[error("Scene with handle {0} not found")]
    SceneNotFound(SceneHandle),

    #[error("no active scene")]
    NoActiveScene,

    #[error("object {0} is destroyed")]
    Destroyed(InstanceId),

    #[error("only root objects can be moved to DontDestroyOnLoad")]
    NotRoot,

    #[error("{0} not available. Are you in-game?")]
    NotAvailable(&'static str),

    #[error("Prefab '{0}' not found")]
    PrefabNotFound(String),

    #[error("No local player found")]
    NoLocalPlayer,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing argument <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: invalid {argument} '{value}'")]
    InvalidArgument {
        command: &'static str,
        argument: &'static str,
        value: String,
    },
}
