//! `KurveServer` builder and accept loop.
//!
//! Ties the layers together: TCP accept → WebSocket upgrade → frame
//! codec → lobby controller. One Tokio task per connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;

use kurve_lobby::{LobbyConfig, LobbyHandle, spawn_lobby};
use kurve_match::MatchDriver;
use kurve_protocol::{Codec, ConnectionId, JsonCodec};

use crate::KurveError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) lobby: LobbyHandle,
    pub(crate) codec: C,
    next_connection_id: AtomicU64,
}

impl<C: Codec> ServerState<C> {
    pub(crate) fn next_connection_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_connection_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for configuring and starting a Kurve server.
pub struct KurveServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
}

impl KurveServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8020".to_string(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the lobby configuration.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener, spawns the lobby controller wired to the
    /// given match driver, and returns the server ready to run.
    ///
    /// Uses [`JsonCodec`] for the wire format.
    pub async fn build(
        self,
        driver: Arc<dyn MatchDriver>,
    ) -> Result<KurveServer<JsonCodec>, KurveError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "listener bound");

        let lobby = spawn_lobby(self.lobby_config, driver);

        let state = Arc::new(ServerState {
            lobby,
            codec: JsonCodec,
            next_connection_id: AtomicU64::new(1),
        });

        Ok(KurveServer { listener, state })
    }
}

impl Default for KurveServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Kurve lobby server.
pub struct KurveServer<C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<C>>,
}

impl<C: Codec + Clone> KurveServer<C> {
    pub fn builder() -> KurveServerBuilder {
        KurveServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), KurveError> {
        tracing::info!("kurve server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let connection = self.state.next_connection_id();
                    tracing::debug!(%connection, %addr, "accepted TCP connection");

                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(error) = handle_connection(stream, connection, state).await {
                            tracing::debug!(%connection, %error, "connection ended with error");
                        }
                    });
                }
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                }
            }
        }
    }
}
