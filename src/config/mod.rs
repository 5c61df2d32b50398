//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions and [`Config::load`]
//! - [`listen`]: Local listener configuration (display and control sockets)
//! - `defaults`: serde default value functions
//! - `validation`: startup checks run by [`Config::load`]

mod defaults;
mod listen;
mod types;
mod validation;

pub use listen::{ControlConfig, DisplayConfig};
pub use types::{ChatConfig, Config, CredentialsConfig};
