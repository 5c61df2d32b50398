//! Supervision of the single active chat session.
//!
//! The active session lives in a `watch` channel. Switching targets first
//! publishes the new session there and then closes the old one, so a
//! [`DisplayStream`] that notices the close can always tell a supersession
//! (the watch moved on) from a session that failed for good.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::format::{Formatter, format_local};
use super::session::{ChatSession, SessionConfig, SessionHandle};
use super::state::SessionState;
use crate::auth::CredentialProvider;
use crate::config::ChatConfig;
use crate::error::{RelayError, SessionError};

/// Owns the active session and fans lines between it and display consumers.
pub struct ChatRelay {
    chat: ChatConfig,
    credentials: Arc<dyn CredentialProvider>,
    formatter: Arc<Formatter>,
    local_color: String,
    active: watch::Sender<Option<SessionHandle>>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
}

impl ChatRelay {
    pub fn new(
        chat: ChatConfig,
        credentials: Arc<dyn CredentialProvider>,
        formatter: Arc<Formatter>,
        local_color: impl Into<String>,
        shutdown: CancellationToken,
    ) -> Self {
        let (active, _) = watch::channel(None);
        Self {
            chat,
            credentials,
            formatter,
            local_color: local_color.into(),
            active,
            next_id: AtomicU64::new(1),
            shutdown,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Open a session for `target` and make it the only active one.
    ///
    /// `user` and `password` fall back to the credential provider when
    /// absent or empty. The previous session is detached before it is
    /// closed. Returns the new session's id.
    pub async fn select_target(
        &self,
        user: Option<&str>,
        target: &str,
        password: Option<&str>,
    ) -> Result<u64, RelayError> {
        if target.is_empty() {
            return Err(SessionError::EmptyTarget.into());
        }

        let username = user
            .filter(|u| !u.is_empty())
            .map_or_else(|| self.credentials.username(), str::to_string);
        let password = password
            .filter(|p| !p.is_empty())
            .map_or_else(|| self.credentials.password(), str::to_string);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let config = SessionConfig::new(&self.chat, target, username, password);
        let handle = ChatSession::open(
            id,
            config,
            Arc::clone(&self.formatter),
            self.shutdown.child_token(),
        )
        .await?;

        if let Some(old) = self.active.send_replace(Some(handle)) {
            info!(old = old.id(), old_target = %old.target(), new = id, %target, "Switching chat target");
            old.close();
        } else {
            info!(new = id, %target, "Chat target selected");
        }
        Ok(id)
    }

    /// The currently active session, if any.
    pub fn active(&self) -> Option<SessionHandle> {
        self.active.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.active()
            .map_or(SessionState::Disconnected, |handle| handle.state())
    }

    /// Queue user text for the active session's target.
    ///
    /// Reports [`RelayError::NotConnected`] when no session was ever selected.
    pub async fn post_user_message(&self, text: String) -> Result<(), RelayError> {
        let handle = self.active().ok_or(RelayError::NotConnected)?;
        handle.send_text(text).await?;
        Ok(())
    }

    /// Put a locally authored line on the display stream.
    pub async fn echo_local(&self, text: &str) -> Result<(), RelayError> {
        let handle = self.active().ok_or(RelayError::NotConnected)?;
        let line = format_local(&self.credentials.username(), &self.local_color, text);
        handle.push_display(line).await?;
        Ok(())
    }

    /// A stream of formatted lines that follows target switches.
    pub fn outbound_stream(&self) -> DisplayStream {
        DisplayStream {
            active: self.active.subscribe(),
        }
    }

    /// Close the active session, if any.
    pub fn close(&self) {
        if let Some(handle) = self.active.send_replace(None) {
            handle.close();
        }
    }
}

/// Lazy sequence of display lines from whichever session is active.
///
/// Lines still queued in a superseded session are discarded. When the
/// active session fails for good, buffered lines are drained and then the
/// stream ends.
///
/// Every stream reads the same session queue, so with several consumers
/// attached each line (local echoes included) reaches exactly one of them,
/// not necessarily the one whose user typed it.
pub struct DisplayStream {
    active: watch::Receiver<Option<SessionHandle>>,
}

impl DisplayStream {
    pub async fn next(&mut self) -> Option<String> {
        loop {
            let current = self.active.borrow_and_update().clone();
            let Some(handle) = current else {
                // No session yet; wait for one (or for the relay to go away).
                self.active.changed().await.ok()?;
                continue;
            };

            let mut rx = handle.display_rx().lock().await;

            if handle.is_closed() {
                if self.active.has_changed().unwrap_or(false) {
                    debug!(session = handle.id(), "Dropping lines from superseded session");
                    continue;
                }
                return rx.try_recv().ok();
            }

            tokio::select! {
                biased;
                changed = self.active.changed() => {
                    if changed.is_err() {
                        warn!("Relay dropped while streaming");
                        return None;
                    }
                }
                _ = handle.closed() => {}
                line = rx.recv() => return line,
            }
        }
    }
}
