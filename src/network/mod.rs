//! Network module.
//!
//! Contains the display Gateway (WebSocket listener) and the per-consumer
//! bridge that pumps lines between a WebSocket and the chat relay.

mod bridge;
mod gateway;

pub use gateway::DisplayGateway;
