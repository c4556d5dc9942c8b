//! Tool failures and their wire form.

use probe_core::{BridgeError, InstanceId};
use probe_scene::SceneError;
use serde_json::{Value as Json, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Invalid arguments: {0}")]
    Arguments(serde_json::Error),

    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("GameObject with instanceId {0} not found or was destroyed")]
    GameObjectNotFound(InstanceId),

    #[error("Component '{component}' not found on GameObject")]
    ComponentNotFound {
        component: String,
        available: Vec<String>,
    },

    #[error("No prefabs loaded in ZNetScene")]
    NoPrefabs,
}

impl ToolError {
    /// `{"success": false, "error": ...}`, plus `availableComponents` on a
    /// component miss.
    #[must_use]
    pub fn to_reply(&self) -> Json {
        let mut reply = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let Self::ComponentNotFound { available, .. } = self {
            reply["availableComponents"] = json!(available);
        }
        reply
    }
}
