//! Control plane.
//!
//! A local TCP socket where other processes call relay and remote-API
//! operations with a JSON envelope:
//!
//! ```text
//! -> {"api": "local", "name": "changeChat", "params": {"query": "somechannel"}}
//! <- {"method": "changeChat", "result": true}
//! ```
//!
//! `namespace`/`method` are accepted as aliases for `api`/`name`. Failures
//! come back as `{"method": ..., "error": {"code": ..., "message": ...}}`.

mod framing;
pub mod handlers;
mod registry;
mod request;
mod response;
mod server;

pub use registry::{Namespace, Registry};
pub use server::ControlServer;
