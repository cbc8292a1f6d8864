//! `CrownhuntServer` builder and server loop.
//!
//! This is the entry point for running a Crownhunt server. It ties the
//! layers together: transport, connection handler, and game coordinator.

use std::time::Duration;

use crownhunt_game::{GameConfig, GameHandle, spawn_game};
use crownhunt_transport::{Transport, WebSocketTransport};
use tokio_util::sync::CancellationToken;

use crate::CrownhuntError;
use crate::handler::handle_connection;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on. Default: `127.0.0.1:8080`.
    pub bind_addr: String,

    /// Settings for the game the server hosts.
    pub game: GameConfig,

    /// A connection that sends nothing for this long is closed.
    /// Default: 60 seconds.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game: GameConfig::default(),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Builder for configuring and starting a Crownhunt server.
///
/// # Example
///
/// ```rust,no_run
/// use crownhunt::prelude::*;
///
/// # async fn demo() -> Result<(), CrownhuntError> {
/// let server = CrownhuntServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CrownhuntServerBuilder {
    config: ServerConfig,
    shutdown: Option<CancellationToken>,
}

impl CrownhuntServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the game configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config.game = config;
        self
    }

    /// Sets the read idle timeout for connections.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Uses an existing token to stop the server. By default the server
    /// creates its own, available from
    /// [`CrownhuntServer::shutdown_token`].
    pub fn shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Starts the game and binds the listener.
    ///
    /// # Errors
    /// Fails if the arena size is invalid or the address can't be bound.
    pub async fn build(self) -> Result<CrownhuntServer, CrownhuntError> {
        let game = spawn_game(self.config.game)?;
        let transport = match WebSocketTransport::bind(&self.config.bind_addr).await {
            Ok(transport) => transport,
            Err(e) => {
                game.shutdown();
                return Err(e.into());
            }
        };

        Ok(CrownhuntServer {
            transport,
            game,
            shutdown: self.shutdown.unwrap_or_default(),
            idle_timeout: self.config.idle_timeout,
        })
    }
}

/// A Crownhunt server hosting one game.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CrownhuntServer {
    transport: WebSocketTransport,
    game: GameHandle,
    shutdown: CancellationToken,
    idle_timeout: Duration,
}

impl CrownhuntServer {
    /// Creates a new builder.
    pub fn builder() -> CrownhuntServerBuilder {
        CrownhuntServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The hosted game.
    pub fn game(&self) -> &GameHandle {
        &self.game
    }

    /// Cancelling this token stops [`run()`](Self::run).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connection. Returns once the shutdown
    /// token is cancelled or the game stops, after shutting the game down;
    /// every connection then sees its outbox close and ends.
    pub async fn run(mut self) -> Result<(), CrownhuntError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Crownhunt server running");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.game.closed() => {
                    tracing::warn!("game stopped, closing server");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let game = self.game.clone();
                        let idle_timeout = self.idle_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, game, idle_timeout).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }

        self.game.shutdown();
        self.game.closed().await;
        tracing::info!("Crownhunt server stopped");
        Ok(())
    }
}
