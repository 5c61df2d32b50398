//! Local listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

use super::defaults::{
    default_chunk_size, default_control_address, default_display_address, default_display_path,
    default_local_color,
};

/// Display (WebSocket) listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Address to bind to (e.g., "127.0.0.1:1922").
    #[serde(default = "default_display_address")]
    pub address: SocketAddr,
    /// Request path that is upgraded to a WebSocket.
    #[serde(default = "default_display_path")]
    pub path: String,
    /// Allowed origins for CORS (empty = allow all).
    #[serde(default)]
    pub allow_origins: Vec<String>,
    /// `#RRGGBB` color for lines typed by the local user.
    #[serde(default = "default_local_color")]
    pub local_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: default_display_address(),
            path: default_display_path(),
            allow_origins: Vec::new(),
            local_color: default_local_color(),
        }
    }
}

/// Control-plane listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    /// Address to bind to (e.g., "127.0.0.1:1921").
    #[serde(default = "default_control_address")]
    pub address: SocketAddr,
    /// Read size used to detect the end of a request.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            address: default_control_address(),
            chunk_size: default_chunk_size(),
        }
    }
}
