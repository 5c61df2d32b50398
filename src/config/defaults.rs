//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

// =============================================================================
// Chat Defaults
// =============================================================================

pub fn default_chat_server() -> String {
    "irc.twitch.tv:6667".to_string()
}

pub fn default_max_retries() -> u32 {
    3
}

pub fn default_read_timeout_secs() -> u64 {
    300
}

pub fn default_queue_capacity() -> usize {
    128
}

pub fn default_backoff_base_ms() -> u64 {
    200
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_display_address() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1922)
}

pub fn default_display_path() -> String {
    "/ws".to_string()
}

/// Color used for locally echoed lines.
pub fn default_local_color() -> String {
    "#8A2BE2".to_string()
}

pub fn default_control_address() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1921)
}

pub fn default_chunk_size() -> usize {
    256
}

// =============================================================================
// Media Defaults
// =============================================================================

pub fn default_media_resolver() -> String {
    "youtube-dl".to_string()
}
