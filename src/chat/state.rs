//! Session lifecycle states.

use std::fmt;

/// Where a chat session is in its connection lifecycle.
///
/// Published on a `watch` channel so the relay and tests can observe
/// transitions without polling the session tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Login sent, waiting for the welcome reply.
    Authenticating,
    /// Welcome received, capabilities and JOIN being sent.
    Joining,
    Joined,
    /// Read failed; backing off before the next connect attempt.
    Reconnecting,
    /// Retries exhausted or session superseded. Terminal.
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Joining => "joining",
            Self::Joined => "joined",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
