//! Error taxonomy for the bridge.
//!
//! Local pre-flight failures (`InvalidArgument`, `NoActiveTestSession`)
//! are raised before any network call. Remote failures carry enough
//! structured context (status, method, endpoint) for the caller to decide
//! whether to retry, open the project, or start a new run.

use thiserror::Error;

/// Remote response bodies are truncated to this many characters before
/// they are echoed back to the caller.
const MAX_REMOTE_MESSAGE_LEN: usize = 300;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required identifier is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A poll was attempted for a project with no committed test session.
    #[error("no active test session for project '{0}' - start a test run first")]
    NoActiveTestSession(String),

    /// The remote service answered with a non-success status.
    #[error("remote request failed: {method} {endpoint} returned {status}: {message}")]
    RemoteRequestFailed {
        status: u16,
        method: &'static str,
        endpoint: String,
        message: String,
    },

    /// A single transport call exceeded its timeout.
    #[error("remote request timed out: {method} {endpoint}")]
    Timeout {
        method: &'static str,
        endpoint: String,
    },
}

impl BridgeError {
    /// Build a `RemoteRequestFailed` from a raw response body, sanitizing
    /// the message first.
    pub fn remote(status: u16, method: &'static str, endpoint: impl Into<String>, body: &str) -> Self {
        BridgeError::RemoteRequestFailed {
            status,
            method,
            endpoint: endpoint.into(),
            message: sanitize_remote_message(body),
        }
    }

    /// The remote HTTP status, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::RemoteRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Collapse whitespace and truncate a remote response body so error
/// messages stay single-line and bounded. Credentials never reach this
/// function: request headers are not echoed into response bodies by the
/// remote service, and the bridge never logs its own Authorization or
/// Cookie values.
pub fn sanitize_remote_message(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= MAX_REMOTE_MESSAGE_LEN {
        collapsed
    } else {
        let mut end = MAX_REMOTE_MESSAGE_LEN;
        while !collapsed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &collapsed[..end])
    }
}
