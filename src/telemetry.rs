//! Tracing span constructors.
//!
//! Long-lived tasks are instrumented with one of these so every log line
//! they emit carries the target or peer it belongs to.

/// Standardized span constructors for relay observability.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, info_span};

    /// Create a span for a chat session.
    pub fn session(id: u64, target: &str) -> Span {
        info_span!("session", id = id, target = %target)
    }

    /// Create a span for a control-plane connection.
    pub fn control_connection(addr: SocketAddr) -> Span {
        info_span!("control", %addr)
    }

    /// Create a span for a display consumer.
    pub fn display_connection(addr: SocketAddr) -> Span {
        info_span!("display", %addr)
    }

    /// Create a span for one control-plane dispatch.
    pub fn dispatch(namespace: &str, method: &str) -> Span {
        info_span!("dispatch", namespace = %namespace, method = %method)
    }
}
