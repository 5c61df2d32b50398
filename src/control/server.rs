//! Control listener.
//!
//! Each connection gets its own task. Requests on one connection are
//! handled in order; a failed call is answered with an error envelope and
//! the connection stays open.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, warn};

use super::framing::read_request;
use super::registry::Registry;
use crate::config::ControlConfig;
use crate::telemetry::spans;

pub struct ControlServer {
    listener: TcpListener,
    chunk_size: usize,
}

impl ControlServer {
    pub async fn bind(config: &ControlConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.address).await?;
        Ok(Self {
            listener,
            chunk_size: config.chunk_size,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, registry: Arc<Registry>, shutdown: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, addr) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "Failed to accept control connection");
                    continue;
                }
            };

            let registry = Arc::clone(&registry);
            let shutdown = shutdown.clone();
            let chunk_size = self.chunk_size;
            tokio::spawn(
                async move {
                    debug!("Control client connected");
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        result = serve(stream, &registry, chunk_size) => {
                            if let Err(e) = result {
                                warn!(error = %e, "Control connection error");
                            }
                        }
                    }
                    debug!("Control client disconnected");
                }
                .instrument(spans::control_connection(addr)),
            );
        }
        info!("Control listener stopped");
    }
}

async fn serve(mut stream: TcpStream, registry: &Registry, chunk_size: usize) -> std::io::Result<()> {
    while let Some(request) = read_request(&mut stream, chunk_size).await? {
        let response = registry.dispatch_bytes(&request).await;
        if response.is_error() {
            debug!(method = %response.method, "Answering with error envelope");
        }
        let bytes = match response.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(method = %response.method, error = %e, "Failed to encode control response");
                continue;
            }
        };
        stream.write_all(&bytes).await?;
    }
    Ok(())
}
