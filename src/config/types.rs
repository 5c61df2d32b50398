//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_backoff_base_ms, default_chat_server, default_max_retries, default_media_resolver,
    default_queue_capacity, default_read_timeout_secs,
};
use super::listen::{ControlConfig, DisplayConfig};
use super::validation::{self, ValidationError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Upstream chat server and session tuning.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Account used to log into the chat server.
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Display (WebSocket) listener.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Control-plane listener.
    #[serde(default)]
    pub control: ControlConfig,
    /// External media resolver.
    #[serde(default)]
    pub media: MediaConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Chat server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// `host:port` of the chat server.
    #[serde(default = "default_chat_server")]
    pub server: String,
    /// Reconnect attempts before a session gives up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds a read may stall before the connection counts as lost.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Capacity of each per-session queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// First reconnect delay in milliseconds; doubles per attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Channel joined at startup, if any.
    #[serde(default)]
    pub default_target: Option<String>,
}

impl ChatConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            server: default_chat_server(),
            max_retries: default_max_retries(),
            read_timeout_secs: default_read_timeout_secs(),
            queue_capacity: default_queue_capacity(),
            backoff_base_ms: default_backoff_base_ms(),
            default_target: None,
        }
    }
}

/// Chat account credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub username: String,
    /// OAuth token; the `oauth:` marker is added on the wire when missing.
    #[serde(default)]
    pub password: String,
}

/// External media resolver settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Executable invoked to resolve stream URLs and descriptions.
    #[serde(default = "default_media_resolver")]
    pub resolver: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            resolver: default_media_resolver(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.chat.server, "irc.twitch.tv:6667");
        assert_eq!(config.chat.max_retries, 3);
        assert_eq!(config.chat.read_timeout(), Duration::from_secs(300));
        assert_eq!(config.chat.backoff_base(), Duration::from_millis(200));
        assert_eq!(config.chat.queue_capacity, 128);
        assert_eq!(config.display.path, "/ws");
        assert_eq!(config.display.address.port(), 1922);
        assert_eq!(config.control.address.port(), 1921);
        assert_eq!(config.control.chunk_size, 256);
        assert_eq!(config.media.resolver, "youtube-dl");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[chat]
server = "127.0.0.1:6667"
max_retries = 5
default_target = "#room"

[credentials]
username = "bot"
password = "secret"

[display]
address = "127.0.0.1:9000"
allow_origins = ["http://localhost"]
"##
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.chat.server, "127.0.0.1:6667");
        assert_eq!(config.chat.max_retries, 5);
        assert_eq!(config.chat.default_target.as_deref(), Some("#room"));
        assert_eq!(config.credentials.username, "bot");
        assert_eq!(config.display.address.port(), 9000);
        assert_eq!(config.display.allow_origins, vec!["http://localhost"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = Config::from_toml("[chat\nserver = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = Config::from_toml("[control]\nchunk_size = 0\n").unwrap_err();
        match err {
            ConfigError::Invalid(errors) => {
                assert_eq!(errors, vec![ValidationError::ZeroChunkSize]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
