//! Error types for bridge operations.

use thiserror::Error;

use crate::InstanceId;

/// Errors that can occur while resolving, reading or dispatching.
///
/// Every variant is local to a single request: callers turn these into a
/// `{"success": false, "error": ...}` response and carry on.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No live object carries this identity.
    #[error("Object with instanceId {0} not found or was destroyed")]
    NotFound(InstanceId),

    /// The identity resolved, but to a different kind of object.
    #[error("Object with instanceId {id} is not a {expected}")]
    TypeMismatch { id: InstanceId, expected: &'static str },

    /// The object has no member with this name.
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// The member exists but could not be read.
    #[error("Member {member} is unreadable: {reason}")]
    Unreadable { member: String, reason: String },

    /// Request timed out waiting for the host tick.
    #[error("Request timeout")]
    Timeout,

    /// The host loop is gone and will never run the request.
    #[error("Channel disconnected")]
    ChannelDisconnected,

    /// The request panicked on the host thread; carries the panic message.
    #[error("{0}")]
    Panicked(String),

    /// A caller-supplied argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
