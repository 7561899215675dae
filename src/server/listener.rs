//! TCP accept loop.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::server::config::ServerConfig;
use crate::server::registry::Registry;
use crate::server::session::run_session;

pub struct TableServer {
    listener: TcpListener,
    registry: Arc<Registry>,
    config: Arc<ServerConfig>,
}

impl TableServer {
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        let registry = Arc::new(Registry::new(config.time_control));
        Ok(Self {
            listener,
            registry,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> io::Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(%err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Accepts connections until `shutdown` resolves. Sessions already running
    /// are left to finish on their own.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!(%addr, "table server listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(%addr, "shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            warn!(%err, "accept failed");
                            continue;
                        }
                    };
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(%peer, %err, "cannot set TCP_NODELAY");
                    }

                    let registry = Arc::clone(&self.registry);
                    let config = Arc::clone(&self.config);
                    tokio::spawn(async move {
                        info!(%peer, "connection accepted");
                        match run_session(stream, Some(peer), registry, &config).await {
                            Ok(()) => info!(%peer, "connection closed"),
                            Err(err) => warn!(%peer, %err, "connection dropped"),
                        }
                    });
                }
            }
        }
    }
}
