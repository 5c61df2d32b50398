//! Error types for the relay daemon.
//!
//! Each layer has its own error enum: [`SessionError`] for one chat server
//! connection, [`RelayError`] for target switching and message intake, and
//! [`ControlError`] for control-plane dispatch.

use chatrelay_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Session Errors (chat server connection)
// ============================================================================

/// Errors raised while opening or driving a chat session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("read timed out after {0:?}")]
    ReadTimeout(std::time::Duration),

    #[error("connection closed by server")]
    Closed,

    #[error("session queue closed")]
    QueueClosed,

    #[error("target must not be empty")]
    EmptyTarget,
}

// ============================================================================
// Relay Errors (target switching, user messages)
// ============================================================================

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no active chat session")]
    NotConnected,

    #[error(transparent)]
    Session(#[from] SessionError),
}

// ============================================================================
// Control Errors (control-plane dispatch)
// ============================================================================

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("method not found: {namespace}.{method}")]
    MethodNotFound { namespace: String, method: String },

    #[error("handler failed: {0}")]
    Handler(String),
}

impl ControlError {
    /// Get a static error code string for error envelopes.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::UnknownNamespace(_) => "unknown_namespace",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::Handler(_) => "handler_error",
        }
    }
}
