//! Dispatch table for control-plane calls.
//!
//! Built once at startup and never mutated afterwards, so lookups need no
//! locking. A miss is answered with a `method_not_found` error response.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{Instrument, debug, warn};

use super::handlers::local::{ChangeChat, IsAuthenticated, MediaResolver, StreamDesc, StreamUrl};
use super::handlers::remote::{RemoteApi, RemoteMethod};
use super::request::ControlRequest;
use super::response::ControlResponse;
use crate::chat::ChatRelay;
use crate::error::ControlError;
use crate::telemetry::spans;

/// Handler for one `(namespace, method)` pair.
///
/// Receives the JSON-encoded params and returns a JSON-encoded result.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, params: &[u8]) -> Result<Vec<u8>, ControlError>;
}

/// Known namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Operations served by this process.
    Local,
    /// Pass-through calls to the remote chat platform API.
    Twitch,
}

impl Namespace {
    /// Parses a namespace string (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, ControlError> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "twitch" => Ok(Self::Twitch),
            _ => Err(ControlError::UnknownNamespace(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Twitch => "twitch",
        }
    }
}

/// Registry of control handlers.
pub struct Registry {
    handlers: HashMap<Namespace, HashMap<&'static str, Box<dyn Handler>>>,
}

impl Registry {
    /// Create a registry with the local handlers and, when given, the
    /// remote API's methods under [`Namespace::Twitch`].
    pub fn new(
        relay: Arc<ChatRelay>,
        resolver: MediaResolver,
        remote: Option<Arc<dyn RemoteApi>>,
    ) -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        let resolver = Arc::new(resolver);

        registry.insert(Namespace::Local, "changeChat", ChangeChat::new(Arc::clone(&relay)));
        registry.insert(
            Namespace::Local,
            "isAuthenticated",
            IsAuthenticated::new(Arc::clone(relay.credentials())),
        );
        registry.insert(Namespace::Local, "getStreamUrl", StreamUrl::new(Arc::clone(&resolver)));
        registry.insert(Namespace::Local, "getStreamDesc", StreamDesc::new(resolver));

        if let Some(api) = remote {
            for &method in api.methods() {
                registry.insert(
                    Namespace::Twitch,
                    method,
                    RemoteMethod::new(Arc::clone(&api), method),
                );
            }
        }

        registry
    }

    fn insert(&mut self, namespace: Namespace, method: &'static str, handler: impl Handler + 'static) {
        self.handlers
            .entry(namespace)
            .or_default()
            .insert(method, Box::new(handler));
    }

    /// Names registered under `namespace`, sorted.
    pub fn methods(&self, namespace: Namespace) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .handlers
            .get(&namespace)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    fn lookup(&self, request: &ControlRequest) -> Result<&dyn Handler, ControlError> {
        let namespace = Namespace::parse(&request.namespace)?;
        self.handlers
            .get(&namespace)
            .and_then(|methods| methods.get(request.method.as_str()))
            .map(|handler| &**handler)
            .ok_or_else(|| ControlError::MethodNotFound {
                namespace: namespace.as_str().to_string(),
                method: request.method.clone(),
            })
    }

    /// Dispatch a parsed request.
    pub async fn dispatch(&self, request: &ControlRequest) -> ControlResponse {
        let span = spans::dispatch(&request.namespace, &request.method);
        let outcome = match self.lookup(request) {
            Ok(handler) => handler.handle(&request.params_bytes()).instrument(span).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(raw) => ControlResponse::success(&request.method, decode_result(&request.method, &raw)),
            Err(e) => {
                debug!(method = %request.method, error = %e, "Control call failed");
                ControlResponse::failure(&request.method, &e)
            }
        }
    }

    /// Parse and dispatch one framed request.
    pub async fn dispatch_bytes(&self, bytes: &[u8]) -> ControlResponse {
        match ControlRequest::parse(bytes) {
            Ok(request) => self.dispatch(&request).await,
            Err(e) => {
                warn!(error = %e, "Could not parse control request");
                ControlResponse::failure("", &e)
            }
        }
    }
}

/// Handler output that is not valid JSON becomes `null`.
fn decode_result(method: &str, raw: &[u8]) -> Value {
    serde_json::from_slice(raw).unwrap_or_else(|e| {
        warn!(%method, error = %e, "Handler returned invalid JSON");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::chat::Formatter;
    use crate::chat::format::FixedColor;
    use crate::config::ChatConfig;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    struct FakeApi;

    #[async_trait]
    impl RemoteApi for FakeApi {
        fn methods(&self) -> &'static [&'static str] {
            &["getChannel", "getBroken"]
        }

        async fn call(&self, method: &str, params: &[u8]) -> Result<Vec<u8>, ControlError> {
            match method {
                "getChannel" => {
                    let params: Value = serde_json::from_slice(params).unwrap_or_default();
                    Ok(json!({"name": params["channel"], "views": 10}).to_string().into_bytes())
                }
                _ => Ok(b"<html>".to_vec()),
            }
        }
    }

    fn registry(remote: Option<Arc<dyn RemoteApi>>) -> Registry {
        let relay = Arc::new(ChatRelay::new(
            ChatConfig::default(),
            Arc::new(StaticCredentials::new("bot", "secret")),
            Arc::new(Formatter::new(FixedColor("#000000".into()))),
            "#8A2BE2",
            CancellationToken::new(),
        ));
        Registry::new(relay, MediaResolver::new("echo"), remote)
    }

    fn request(namespace: &str, method: &str, params: Value) -> ControlRequest {
        ControlRequest {
            namespace: namespace.into(),
            method: method.into(),
            params,
        }
    }

    #[test]
    fn test_namespace_parse() {
        assert_eq!(Namespace::parse("LOCAL").unwrap(), Namespace::Local);
        assert_eq!(Namespace::parse("twitch").unwrap(), Namespace::Twitch);
        assert!(matches!(
            Namespace::parse("x"),
            Err(ControlError::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_local_methods_registered() {
        assert_eq!(
            registry(None).methods(Namespace::Local),
            vec!["changeChat", "getStreamDesc", "getStreamUrl", "isAuthenticated"]
        );
        assert!(registry(None).methods(Namespace::Twitch).is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_pair_is_error_response() {
        let registry = registry(None);

        let response = registry.dispatch(&request("x", "y", json!({}))).await;
        assert_eq!(response.error.unwrap().code, "unknown_namespace");

        let response = registry.dispatch(&request("local", "y", json!({}))).await;
        assert_eq!(response.method, "y");
        assert_eq!(response.error.unwrap().code, "method_not_found");

        let response = registry.dispatch(&request("twitch", "getChannel", json!({}))).await;
        assert_eq!(response.error.unwrap().code, "method_not_found");
    }

    #[tokio::test]
    async fn test_is_authenticated() {
        let response = registry(None)
            .dispatch(&request("local", "isAuthenticated", Value::Null))
            .await;
        assert_eq!(response, ControlResponse::success("isAuthenticated", json!(true)));
    }

    #[tokio::test]
    async fn test_remote_methods_dispatch() {
        let registry = registry(Some(Arc::new(FakeApi)));

        let response = registry
            .dispatch(&request("twitch", "getChannel", json!({"channel": "foo"})))
            .await;
        assert_eq!(response.result, Some(json!({"name": "foo", "views": 10})));

        let response = registry
            .dispatch(&request("twitch", "getBroken", Value::Null))
            .await;
        assert_eq!(response.result, Some(Value::Null));
        assert!(!response.is_error());
    }

    #[tokio::test]
    async fn test_malformed_bytes() {
        let response = registry(None).dispatch_bytes(b"{oops").await;
        assert_eq!(response.error.unwrap().code, "malformed_request");
    }
}
