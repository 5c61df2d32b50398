//! One live connection to the chat server.
//!
//! A session runs three tasks bound to one cancellation token:
//!
//! - **receive**: reads from the server under a read deadline, answers PING
//!   in place, forwards everything else to the sort queue, and on any read
//!   error reconnects with backoff (re-sending the login).
//! - **sort**: reacts to the welcome reply (CAP REQ + JOIN) and formats
//!   PRIVMSGs into the display queue.
//! - **transmit**: wraps user text as PRIVMSG to the target.
//!
//! When reconnecting gives up the state becomes [`SessionState::Closed`] and
//! the token is cancelled, which stops the other two tasks.

use std::sync::Arc;
use std::time::Duration;

use chatrelay_proto::{Capability, ChatCodec, Message, command};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, trace, warn};

use super::backoff::{BackoffPolicy, retry_with_backoff};
use super::format::Formatter;
use super::state::SessionState;
use crate::config::ChatConfig;
use crate::error::SessionError;
use crate::telemetry::spans;

type Reader = FramedRead<OwnedReadHalf, ChatCodec>;
type Writer = FramedWrite<OwnedWriteHalf, ChatCodec>;
type SharedWriter = Arc<Mutex<Writer>>;

/// Everything needed to open a session for one target.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server: String,
    pub target: String,
    pub username: String,
    pub password: String,
    pub read_timeout: Duration,
    pub queue_capacity: usize,
    pub backoff: BackoffPolicy,
}

impl SessionConfig {
    pub fn new(
        chat: &ChatConfig,
        target: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: chat.server.clone(),
            target: target.into(),
            username: username.into(),
            password: password.into(),
            read_timeout: chat.read_timeout(),
            queue_capacity: chat.queue_capacity,
            backoff: BackoffPolicy::new(chat.backoff_base(), chat.max_retries),
        }
    }
}

/// Cloneable handle to a running session.
///
/// Dropping every handle does not stop the session; call [`close`](Self::close).
#[derive(Clone)]
pub struct SessionHandle {
    id: u64,
    target: Arc<str>,
    outgoing_tx: mpsc::Sender<String>,
    display_tx: mpsc::Sender<String>,
    display_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    state: watch::Receiver<SessionState>,
    token: CancellationToken,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    #[cfg(test)]
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Queue user text for the server; it is sent as a PRIVMSG to the target.
    pub async fn send_text(&self, text: String) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::QueueClosed);
        }
        self.outgoing_tx
            .send(text)
            .await
            .map_err(|_| SessionError::QueueClosed)
    }

    /// Push an already formatted line straight to the display queue.
    pub async fn push_display(&self, line: String) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::QueueClosed);
        }
        self.display_tx
            .send(line)
            .await
            .map_err(|_| SessionError::QueueClosed)
    }

    pub(crate) fn display_rx(&self) -> &Arc<Mutex<mpsc::Receiver<String>>> {
        &self.display_rx
    }

    /// Stop every task of this session. Idempotent.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the session has been closed for any reason.
    pub async fn closed(&self) {
        self.token.cancelled().await
    }
}

/// Opens sessions. Holds nothing itself; each session's state lives in
/// its tasks.
pub struct ChatSession;

impl ChatSession {
    /// Connect, log in and spawn the session tasks.
    ///
    /// Fails only when the first transport connect or login write fails;
    /// a rejected login shows up later as a session that never joins.
    pub async fn open(
        id: u64,
        config: SessionConfig,
        formatter: Arc<Formatter>,
        token: CancellationToken,
    ) -> Result<SessionHandle, SessionError> {
        if config.target.is_empty() {
            return Err(SessionError::EmptyTarget);
        }

        let span = spans::session(id, &config.target);
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);

        set_state(&state_tx, SessionState::Connecting);
        let (reader, writer) = match connect_and_login(&config)
            .instrument(span.clone())
            .await
        {
            Ok(parts) => parts,
            Err(e) => {
                set_state(&state_tx, SessionState::Closed);
                return Err(e);
            }
        };
        set_state(&state_tx, SessionState::Authenticating);

        let capacity = config.queue_capacity.max(1);
        let (raw_tx, raw_rx) = mpsc::channel::<Message>(capacity);
        let (display_tx, display_rx) = mpsc::channel::<String>(capacity);
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<String>(capacity);

        let state_tx = Arc::new(state_tx);
        let writer: SharedWriter = Arc::new(Mutex::new(writer));
        let target: Arc<str> = Arc::from(config.target.as_str());

        tokio::spawn(
            receive_loop(
                config,
                reader,
                Arc::clone(&writer),
                raw_tx,
                Arc::clone(&state_tx),
                token.clone(),
            )
            .instrument(span.clone()),
        );
        tokio::spawn(
            sort_loop(
                Arc::clone(&target),
                raw_rx,
                display_tx.clone(),
                Arc::clone(&writer),
                formatter,
                state_tx,
                token.clone(),
            )
            .instrument(span.clone()),
        );
        tokio::spawn(
            transmit_loop(Arc::clone(&target), outgoing_rx, writer, token.clone())
                .instrument(span),
        );

        Ok(SessionHandle {
            id,
            target,
            outgoing_tx,
            display_tx,
            display_rx: Arc::new(Mutex::new(display_rx)),
            state: state_rx,
            token,
        })
    }
}

fn set_state(state: &watch::Sender<SessionState>, next: SessionState) {
    let prev = state.send_replace(next);
    if prev != next {
        info!(from = %prev, to = %next, "Session state changed");
    }
}

/// The password with the `oauth:` marker the server expects.
fn oauth_token(password: &str) -> String {
    if password.starts_with("oauth:") {
        password.to_string()
    } else {
        format!("oauth:{password}")
    }
}

/// Send PASS (when a password is set), NICK and USER.
async fn login(writer: &mut Writer, config: &SessionConfig) -> Result<(), SessionError> {
    if !config.password.is_empty() {
        writer.feed(Message::pass(oauth_token(&config.password))).await?;
    }
    writer.feed(Message::nick(&config.username)).await?;
    writer
        .feed(Message::user(&config.username, &config.username))
        .await?;
    writer.flush().await?;
    Ok(())
}

async fn connect_and_login(config: &SessionConfig) -> Result<(Reader, Writer), SessionError> {
    let stream = TcpStream::connect(&config.server)
        .await
        .map_err(|source| SessionError::Connect {
            addr: config.server.clone(),
            source,
        })?;
    debug!(server = %config.server, "Connected to chat server");

    let (read_half, write_half) = stream.into_split();
    let reader = FramedRead::new(read_half, ChatCodec::new());
    let mut writer = FramedWrite::new(write_half, ChatCodec::new());
    login(&mut writer, config).await?;
    Ok((reader, writer))
}

async fn send(writer: &SharedWriter, msg: Message) -> Result<(), SessionError> {
    writer.lock().await.send(msg).await?;
    Ok(())
}

async fn receive_loop(
    config: SessionConfig,
    mut reader: Reader,
    writer: SharedWriter,
    raw_tx: mpsc::Sender<Message>,
    state: Arc<watch::Sender<SessionState>>,
    token: CancellationToken,
) {
    let mut retries = 0u32;

    loop {
        let next = tokio::select! {
            _ = token.cancelled() => break,
            next = tokio::time::timeout(config.read_timeout, reader.next()) => next,
        };

        let result = match next {
            Err(_) => Err(SessionError::ReadTimeout(config.read_timeout)),
            Ok(None) => Err(SessionError::Closed),
            Ok(Some(Err(e))) => Err(SessionError::from(e)),
            Ok(Some(Ok(msg))) => Ok(msg),
        };

        match result {
            Ok(msg) if msg.is_command(command::PING) => {
                trace!("PING");
                if let Err(e) = send(&writer, Message::pong_for(&msg)).await {
                    warn!(error = %e, "Failed to answer PING");
                }
            }
            Ok(msg) => {
                if raw_tx.send(msg).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Chat connection lost");
                set_state(&state, SessionState::Reconnecting);
                let _ = writer.lock().await.close().await;

                let reconnected = retry_with_backoff(&config.backoff, &mut retries, &token, || {
                    set_state(&state, SessionState::Connecting);
                    connect_and_login(&config)
                })
                .await;

                match reconnected {
                    Some((new_reader, new_writer)) => {
                        reader = new_reader;
                        *writer.lock().await = new_writer;
                        set_state(&state, SessionState::Authenticating);
                        info!("Reconnected to chat server");
                    }
                    None => {
                        if !token.is_cancelled() {
                            error!(
                                max_retries = config.backoff.max_retries,
                                "Giving up on chat server"
                            );
                        }
                        break;
                    }
                }
            }
        }
    }

    token.cancel();
    set_state(&state, SessionState::Closed);
}

async fn sort_loop(
    target: Arc<str>,
    mut raw_rx: mpsc::Receiver<Message>,
    display_tx: mpsc::Sender<String>,
    writer: SharedWriter,
    formatter: Arc<Formatter>,
    state: Arc<watch::Sender<SessionState>>,
    token: CancellationToken,
) {
    let mut dropped = 0u64;
    loop {
        let msg = tokio::select! {
            _ = token.cancelled() => break,
            msg = raw_rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        if msg.is_command(command::RPL_WELCOME) {
            set_state(&state, SessionState::Joining);
            if let Err(e) = join(&writer, &target).await {
                // The receive loop sees the broken connection and reconnects.
                warn!(error = %e, "Failed to join target");
                continue;
            }
            set_state(&state, SessionState::Joined);
        } else if msg.is_command(command::PRIVMSG) {
            // Never wait on the display: a stalled consumer must not stop
            // the receive loop from reading and answering PING.
            match display_tx.try_send(formatter.format(&msg)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    dropped += 1;
                    if dropped.is_power_of_two() {
                        warn!(dropped, "Display queue full, dropping chat lines");
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        } else {
            trace!(command = %msg.command, "Ignoring message");
        }
    }
}

async fn join(writer: &SharedWriter, target: &str) -> Result<(), SessionError> {
    let mut writer = writer.lock().await;
    for cap in Capability::ALL {
        writer.feed(Message::cap_req(cap.as_str())).await?;
    }
    writer.feed(Message::join(target)).await?;
    writer.flush().await?;
    Ok(())
}

async fn transmit_loop(
    target: Arc<str>,
    mut outgoing_rx: mpsc::Receiver<String>,
    writer: SharedWriter,
    token: CancellationToken,
) {
    loop {
        let text = tokio::select! {
            _ = token.cancelled() => break,
            text = outgoing_rx.recv() => match text {
                Some(text) => text,
                None => break,
            },
        };

        if let Err(e) = send(&writer, Message::privmsg(&*target, text)).await {
            warn!(error = %e, "Failed to send chat message");
        }
    }
    debug!("Transmit loop stopped");
}
