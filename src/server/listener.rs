//! Relay server listener
//!
//! Handles TCP accept loop and spawns connection handlers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::error::Result;
use crate::identity::IdentityVerifier;
use crate::registry::ConnectionRegistry;
use crate::router::PacketRouter;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::stats::{ServerStats, Uptime};

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    active: AtomicU64,
    rejected: AtomicU64,
}

/// Pairing relay server
pub struct RelayServer<I: IdentityVerifier> {
    config: ServerConfig,
    identity: Arc<I>,
    registry: Arc<ConnectionRegistry>,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
    counters: Arc<Counters>,
    uptime: Uptime,
}

impl<I: IdentityVerifier> RelayServer<I> {
    /// Create a new server with the given configuration and identity verifier
    pub fn new(config: ServerConfig, identity: I) -> Self {
        Self::with_registry(config, identity, Arc::new(ConnectionRegistry::new()))
    }

    /// Create a server over an existing registry
    pub fn with_registry(
        config: ServerConfig,
        identity: I,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            identity: Arc::new(identity),
            registry,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
            counters: Arc::new(Counters::default()),
            uptime: Uptime::start(),
        }
    }

    /// Get a reference to the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    pub async fn stats(&self) -> ServerStats {
        ServerStats {
            total_connections: self.counters.total.load(Ordering::Relaxed),
            active_connections: self.counters.active.load(Ordering::Relaxed),
            rejected_connections: self.counters.rejected.load(Ordering::Relaxed),
            registered_users: self.registry.user_count().await,
            registered_devices: self.registry.connection_count().await,
            uptime: self.uptime.elapsed(),
        }
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Pairing relay listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Pairing relay listening");

        self.serve_until(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Open connections keep running after the accept loop stops.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let permit = match self.acquire_permit() {
            Ok(permit) => permit,
            Err(e) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(peer = %peer_addr, error = %e, "Connection rejected: limit reached");
                return;
            }
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(session_id = session_id, peer = %peer_addr, "New connection");

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        self.counters.total.fetch_add(1, Ordering::Relaxed);
        self.counters.active.fetch_add(1, Ordering::Relaxed);

        let (reader, writer) = socket.into_split();
        let mut connection = Connection::new(
            session_id,
            reader,
            writer,
            peer_addr,
            &self.config,
            PacketRouter::new(Arc::clone(&self.registry)),
            Arc::clone(&self.identity),
        );
        let counters = Arc::clone(&self.counters);

        tokio::spawn(async move {
            if let Err(e) = connection.run().await {
                tracing::debug!(session_id = session_id, error = %e, "Connection error");
            }

            // The slot is free before the connection stops counting as active
            drop(permit);
            counters.active.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    /// Take a connection slot; `Ok(None)` when connections are unlimited
    fn acquire_permit(&self) -> std::result::Result<Option<OwnedSemaphorePermit>, TryAcquireError> {
        match self.connection_semaphore {
            Some(ref sem) => sem.clone().try_acquire_owned().map(Some),
            None => Ok(None),
        }
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }
        Ok(())
    }
}
