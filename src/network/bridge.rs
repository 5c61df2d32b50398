//! Display bridge.
//!
//! One bridge per WebSocket consumer, made of two halves sharing a token:
//! the forward half writes relay lines to the socket, the reverse half turns
//! socket frames into user messages plus a local echo. Whichever half stops
//! first cancels the token, which stops the other.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chat::ChatRelay;

/// Run a bridge until either half fails or `shutdown` is cancelled.
pub async fn run_bridge<S>(
    ws: WebSocketStream<S>,
    addr: SocketAddr,
    relay: Arc<ChatRelay>,
    shutdown: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let token = shutdown.child_token();
    let (mut sink, mut frames) = ws.split();
    let mut lines = relay.outbound_stream();

    let forward = async {
        loop {
            let line = tokio::select! {
                _ = token.cancelled() => break,
                line = lines.next() => line,
            };
            let Some(line) = line else {
                debug!(%addr, "Display stream ended");
                break;
            };
            if let Err(e) = sink.send(WsMessage::Text(line)).await {
                debug!(%addr, error = %e, "Display write failed");
                break;
            }
        }
        token.cancel();
        let _ = sink.close().await;
    };

    let reverse = async {
        loop {
            let frame = tokio::select! {
                _ = token.cancelled() => break,
                frame = frames.next() => frame,
            };
            match frame {
                Some(Ok(WsMessage::Text(text))) => forward_user_text(&relay, addr, text).await,
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%addr, error = %e, "Display read failed");
                    break;
                }
            }
        }
        token.cancel();
    };

    tokio::join!(forward, reverse);
}

/// Send typed text upstream and echo it back to the display.
async fn forward_user_text(relay: &ChatRelay, addr: SocketAddr, text: String) {
    let text = first_line(&text);
    if text.is_empty() {
        return;
    }
    if let Err(e) = relay.post_user_message(text.to_string()).await {
        warn!(%addr, error = %e, "Dropping user message");
        return;
    }
    if let Err(e) = relay.echo_local(text).await {
        warn!(%addr, error = %e, "Local echo failed");
    }
}

/// Text up to the first line break; the wire line ends there, so the local
/// echo must too.
fn first_line(text: &str) -> &str {
    text.split(['\r', '\n']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("hello"), "hello");
        assert_eq!(first_line("hello\r\n"), "hello");
        assert_eq!(first_line("a\nb"), "a");
        assert_eq!(first_line("a\r\nb"), "a");
        assert_eq!(first_line("\nb"), "");
    }
}
