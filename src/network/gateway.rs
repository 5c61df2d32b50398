//! Gateway - WebSocket listener for display consumers.
//!
//! Only requests for the configured path are upgraded, and when an origin
//! allow-list is configured the `Origin` header must match it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

use super::bridge::run_bridge;
use crate::chat::ChatRelay;
use crate::config::DisplayConfig;
use crate::telemetry::spans;

/// Accepts display consumers and spawns a bridge for each.
pub struct DisplayGateway {
    listener: TcpListener,
    path: Arc<str>,
    allow_origins: Arc<[String]>,
}

impl DisplayGateway {
    pub async fn bind(config: &DisplayConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.address).await?;
        Ok(Self {
            listener,
            path: Arc::from(config.path.as_str()),
            allow_origins: Arc::from(config.allow_origins.clone()),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, relay: Arc<ChatRelay>, shutdown: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, addr) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "Failed to accept display connection");
                    continue;
                }
            };

            let relay = Arc::clone(&relay);
            let shutdown = shutdown.clone();
            let path = Arc::clone(&self.path);
            let allowed = Arc::clone(&self.allow_origins);

            tokio::spawn(
                async move {
                    let callback = |req: &Request, response: Response| {
                        check_upgrade(req, response, &path, &allowed, addr)
                    };

                    match accept_hdr_async(stream, callback).await {
                        Ok(ws) => {
                            info!("Display connected");
                            run_bridge(ws, addr, relay, shutdown).await;
                            info!("Display disconnected");
                        }
                        Err(e) => warn!(error = %e, "WebSocket handshake failed"),
                    }
                }
                .instrument(spans::display_connection(addr)),
            );
        }
        info!("Display listener stopped");
    }
}

/// Handshake callback: 404 for other paths, 403 for origins not allowed.
fn check_upgrade(
    req: &Request,
    response: Response,
    path: &str,
    allowed: &[String],
    addr: SocketAddr,
) -> Result<Response, ErrorResponse> {
    if req.uri().path() != path {
        warn!(%addr, path = %req.uri().path(), "WebSocket path rejected");
        return Err(reject(http::StatusCode::NOT_FOUND, "not found"));
    }

    // If allow_origins is empty, allow all origins
    if allowed.is_empty() {
        return Ok(response);
    }

    if let Some(origin) = req.headers().get("Origin").and_then(|o| o.to_str().ok()) {
        if allowed.iter().any(|a| a == origin || a == "*") {
            return Ok(response);
        }
        warn!(%addr, origin = %origin, "WebSocket CORS rejected");
    }

    Err(reject(http::StatusCode::FORBIDDEN, "CORS origin not allowed"))
}

fn reject(status: http::StatusCode, body: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(body.to_string()));
    *response.status_mut() = status;
    response
}
