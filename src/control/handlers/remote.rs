//! Remote API namespace.
//!
//! The REST client itself lives outside this crate; anything implementing
//! [`RemoteApi`] can be plugged into the registry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::control::registry::Handler;
use crate::error::ControlError;

/// A client for the remote platform API.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Method names this client serves.
    fn methods(&self) -> &'static [&'static str];

    /// Call `method` with JSON params, returning the JSON body.
    async fn call(&self, method: &str, params: &[u8]) -> Result<Vec<u8>, ControlError>;
}

/// Adapts one remote method to a registry handler.
pub struct RemoteMethod {
    api: Arc<dyn RemoteApi>,
    method: &'static str,
}

impl RemoteMethod {
    pub fn new(api: Arc<dyn RemoteApi>, method: &'static str) -> Self {
        Self { api, method }
    }
}

#[async_trait]
impl Handler for RemoteMethod {
    async fn handle(&self, params: &[u8]) -> Result<Vec<u8>, ControlError> {
        self.api.call(self.method, params).await
    }
}
