//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chat.server must be host:port, got '{0}'")]
    InvalidServer(String),
    #[error("chat.queue_capacity must be greater than 0")]
    ZeroQueueCapacity,
    #[error("control.chunk_size must be greater than 0")]
    ZeroChunkSize,
    #[error("display.path must start with '/', got '{0}'")]
    InvalidDisplayPath(String),
    #[error("display.local_color must be #RRGGBB, got '{0}'")]
    InvalidColor(String),
    #[error("media.resolver is required")]
    MissingResolver,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let server = &config.chat.server;
    let has_port = server
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !has_port {
        errors.push(ValidationError::InvalidServer(server.clone()));
    }

    if config.chat.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if config.control.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    if !config.display.path.starts_with('/') {
        errors.push(ValidationError::InvalidDisplayPath(
            config.display.path.clone(),
        ));
    }
    if !is_hex_color(&config.display.local_color) {
        errors.push(ValidationError::InvalidColor(
            config.display.local_color.clone(),
        ));
    }

    if config.media.resolver.trim().is_empty() {
        errors.push(ValidationError::MissingResolver);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether `s` is a `#RRGGBB` color.
pub fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
