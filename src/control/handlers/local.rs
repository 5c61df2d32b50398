//! Handlers for the `local` namespace.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{info, warn};

use super::decode_params;
use crate::auth::CredentialProvider;
use crate::chat::ChatRelay;
use crate::control::registry::Handler;
use crate::error::ControlError;

fn json_bool(value: bool) -> Vec<u8> {
    if value { b"true".to_vec() } else { b"false".to_vec() }
}

fn json_string(value: &str) -> Result<Vec<u8>, ControlError> {
    serde_json::to_vec(value).map_err(|e| ControlError::Handler(e.to_string()))
}

// ============================================================================
// changeChat
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ChangeChatParams {
    #[serde(default, alias = "target")]
    query: String,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Switch the relay to another channel. Returns `true` once the new
/// session is connected, `false` otherwise.
pub struct ChangeChat {
    relay: Arc<ChatRelay>,
}

impl ChangeChat {
    pub fn new(relay: Arc<ChatRelay>) -> Self {
        Self { relay }
    }
}

/// Prefix a channel name with `#` unless it already has one.
pub fn channel_name(query: &str) -> String {
    let query = query.trim();
    if query.starts_with('#') {
        query.to_string()
    } else {
        format!("#{query}")
    }
}

#[async_trait]
impl Handler for ChangeChat {
    async fn handle(&self, params: &[u8]) -> Result<Vec<u8>, ControlError> {
        let params: ChangeChatParams = decode_params("changeChat", params);
        let target = channel_name(&params.query);
        if target == "#" {
            warn!("changeChat called without a channel");
            return Ok(json_bool(false));
        }

        match self
            .relay
            .select_target(params.user.as_deref(), &target, params.password.as_deref())
            .await
        {
            Ok(id) => {
                info!(%target, session = id, state = %self.relay.state(), "Chat changed");
                Ok(json_bool(true))
            }
            Err(e) => {
                warn!(%target, error = %e, "Could not change chat");
                Ok(json_bool(false))
            }
        }
    }
}

// ============================================================================
// isAuthenticated
// ============================================================================

pub struct IsAuthenticated {
    credentials: Arc<dyn CredentialProvider>,
}

impl IsAuthenticated {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Handler for IsAuthenticated {
    async fn handle(&self, _params: &[u8]) -> Result<Vec<u8>, ControlError> {
        Ok(json_bool(self.credentials.is_authenticated()))
    }
}

// ============================================================================
// getStreamUrl / getStreamDesc
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct UrlParams {
    #[serde(default)]
    url: String,
}

/// Runs the external media resolver (youtube-dl or compatible).
#[derive(Debug, Clone)]
pub struct MediaResolver {
    program: String,
}

impl MediaResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the resolver and return its stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String, ControlError> {
        let output = Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ControlError::Handler(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ControlError::Handler(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Direct stream URL for a page URL (`-g`).
pub struct StreamUrl {
    resolver: Arc<MediaResolver>,
}

impl StreamUrl {
    pub fn new(resolver: Arc<MediaResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Handler for StreamUrl {
    async fn handle(&self, params: &[u8]) -> Result<Vec<u8>, ControlError> {
        let params: UrlParams = decode_params("getStreamUrl", params);
        let output = self.resolver.run(&["-g", &params.url]).await?;
        json_string(output.trim())
    }
}

/// Stream description for a page URL (`--get-description`).
pub struct StreamDesc {
    resolver: Arc<MediaResolver>,
}

impl StreamDesc {
    pub fn new(resolver: Arc<MediaResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Handler for StreamDesc {
    async fn handle(&self, params: &[u8]) -> Result<Vec<u8>, ControlError> {
        let params: UrlParams = decode_params("getStreamDesc", params);
        let output = self
            .resolver
            .run(&["--get-description", &params.url])
            .await?;
        json_string(output.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::chat::Formatter;
    use crate::chat::format::FixedColor;
    use crate::config::ChatConfig;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    fn relay(server: String) -> Arc<ChatRelay> {
        let chat = ChatConfig {
            server,
            max_retries: 0,
            ..ChatConfig::default()
        };
        Arc::new(ChatRelay::new(
            chat,
            Arc::new(StaticCredentials::new("bot", "secret")),
            Arc::new(Formatter::new(FixedColor("#000000".into()))),
            "#8A2BE2",
            CancellationToken::new(),
        ))
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name("foo"), "#foo");
        assert_eq!(channel_name("#foo"), "#foo");
        assert_eq!(channel_name(" foo "), "#foo");
    }

    #[tokio::test]
    async fn test_change_chat_joins_prefixed_channel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let relay = relay(listener.local_addr().unwrap().to_string());
        let handler = ChangeChat::new(Arc::clone(&relay));

        let result = handler.handle(br#"{"query":"somechannel"}"#).await.unwrap();
        assert_eq!(result, b"true");
        assert_eq!(relay.active().unwrap().target(), "#somechannel");

        let (stream, _) = listener.accept().await.unwrap();
        let mut lines = tokio::io::BufReader::new(stream).lines();
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "PASS oauth:secret");
        relay.close();
    }

    #[tokio::test]
    async fn test_change_chat_reports_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let handler = ChangeChat::new(relay(addr.to_string()));
        assert_eq!(handler.handle(br#"{"query":"x"}"#).await.unwrap(), b"false");
        assert_eq!(handler.handle(b"garbage").await.unwrap(), b"false");
    }

    #[tokio::test]
    async fn test_is_authenticated() {
        let handler = IsAuthenticated::new(Arc::new(StaticCredentials::new("bot", "")));
        assert_eq!(handler.handle(b"").await.unwrap(), b"false");
    }

    #[tokio::test]
    async fn test_stream_url_runs_resolver() {
        let handler = StreamUrl::new(Arc::new(MediaResolver::new("echo")));
        let result = handler
            .handle(br#"{"url":"https://example.com/v"}"#)
            .await
            .unwrap();
        assert_eq!(result, br#""-g https://example.com/v""#);
    }

    #[tokio::test]
    async fn test_stream_desc_escapes_output() {
        let handler = StreamDesc::new(Arc::new(MediaResolver::new("echo")));
        let result = handler.handle(br#"{"url":"say \"hi\""}"#).await.unwrap();
        let value: String = serde_json::from_slice(&result).unwrap();
        assert_eq!(value, r#"--get-description say "hi""#);
    }

    #[tokio::test]
    async fn test_missing_resolver_is_handler_error() {
        let handler = StreamUrl::new(Arc::new(MediaResolver::new(
            "definitely-not-a-real-resolver-binary",
        )));
        assert!(matches!(
            handler.handle(br#"{"url":"x"}"#).await,
            Err(ControlError::Handler(_))
        ));
    }
}
