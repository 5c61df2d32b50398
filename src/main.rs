//! chatrelayd - chat relay daemon
//!
//! Keeps one chat server session open, renders its lines for WebSocket
//! display consumers, and serves a local JSON control socket.

mod auth;
mod chat;
mod config;
mod control;
mod error;
mod network;
mod telemetry;

use crate::auth::{CredentialProvider, StaticCredentials};
use crate::chat::{ChatRelay, Formatter};
use crate::config::Config;
use crate::control::handlers::local::MediaResolver;
use crate::control::{ControlServer, Namespace, Registry};
use crate::network::DisplayGateway;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.chat.server,
        display = %config.display.address,
        control = %config.control.address,
        "Starting chatrelayd"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown requested"),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
            }
            shutdown.cancel();
        });
    }

    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(StaticCredentials::from(&config.credentials));
    if !credentials.is_authenticated() {
        warn!("No chat credentials configured; the server may refuse login");
    }

    let relay = Arc::new(ChatRelay::new(
        config.chat.clone(),
        Arc::clone(&credentials),
        Arc::new(Formatter::with_palette()),
        config.display.local_color.clone(),
        shutdown.clone(),
    ));

    if let Some(target) = config.chat.default_target.as_deref() {
        let target = control::handlers::local::channel_name(target);
        if let Err(e) = relay.select_target(None, &target, None).await {
            error!(%target, error = %e, "Failed to join default target");
        }
    }

    let registry = Arc::new(Registry::new(
        Arc::clone(&relay),
        MediaResolver::new(&config.media.resolver),
        None,
    ));

    info!(
        methods = ?registry.methods(Namespace::Local),
        "Control handlers registered"
    );

    let gateway = DisplayGateway::bind(&config.display).await?;
    let control = ControlServer::bind(&config.control).await?;
    info!(
        display = %gateway.local_addr()?,
        path = %config.display.path,
        control = %control.local_addr()?,
        "Listening"
    );

    tokio::join!(
        gateway.run(Arc::clone(&relay), shutdown.clone()),
        control.run(registry, shutdown.clone()),
    );

    relay.close();
    info!("chatrelayd stopped");
    Ok(())
}
