//! `LobbyServer` builder and accept loop.
//!
//! This is the entry point for running a Lobby server. It ties together
//! all the layers: transport → protocol → session → registry.

use std::future::Future;
use std::sync::Arc;

use lobby_protocol::LineCodec;
use lobby_registry::{Registry, RegistryConfig};
use lobby_transport::{Connection, TcpLineTransport, Transport};
use tokio::sync::watch;

use crate::LobbyError;
use crate::handler::handle_connection;

/// Port used when none is given on the command line.
pub const DEFAULT_PORT: u16 = 10000;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry synchronises itself; nothing else here is mutable.
pub(crate) struct ServerState {
    pub(crate) registry: Arc<Registry>,
    pub(crate) codec: LineCodec,
}

/// Builder for configuring and starting a Lobby server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> Result<(), lobby::LobbyError> {
/// use lobby::prelude::*;
///
/// let server = LobbyServer::builder()
///     .bind("0.0.0.0:10000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LobbyServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
}

impl LobbyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            registry_config: RegistryConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the registry capacities.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<LobbyServer, LobbyError> {
        let transport = TcpLineTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Arc::new(Registry::new(self.registry_config)),
            codec: LineCodec,
        });

        Ok(LobbyServer { transport, state })
    }
}

impl Default for LobbyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Lobby server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct LobbyServer {
    transport: TcpLineTransport,
    state: Arc<ServerState>,
}

impl LobbyServer {
    /// Creates a new builder.
    pub fn builder() -> LobbyServerBuilder {
        LobbyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The shared registry, for inspection.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), LobbyError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` completes.
    ///
    /// Accepts incoming connections and spawns a detached handler task
    /// for each. A failed accept is logged and the loop carries on. When
    /// `signal` fires, accepting stops and every live handler is told to
    /// close, which runs its release sequence.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), LobbyError> {
        tracing::info!(addr = ?self.local_addr().ok(), "lobby server running");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::pin!(signal);

        loop {
            tokio::select! {
                _ = &mut signal => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        tracing::debug!(
                            conn_id = %conn.id(),
                            peer = ?conn.peer_addr(),
                            "connection accepted"
                        );
                        let state = Arc::clone(&self.state);
                        let shutdown = shutdown_rx.clone();
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(conn, state, shutdown).await
                            {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        shutdown_tx.send_replace(true);
        Ok(())
    }
}
