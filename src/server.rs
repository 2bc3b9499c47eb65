//! Listening socket and accept loop.

use std::{io, net::SocketAddr, sync::Arc};

use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info, warn};

use crate::{config::ServerConfig, dial::TcpDialer, session::ProxySession};

/// Accepts clients and runs one [`ProxySession`] per connection.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    pub async fn bind(addr: impl ToSocketAddrs, config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Server {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves forever. A failed connection is logged and never takes the
    /// accept loop down with it.
    pub async fn run(self) -> io::Result<()> {
        info!("listening on {}", self.listener.local_addr()?);

        loop {
            let (client, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!("accept failed: {}", err);
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            tokio::spawn(async move {
                let session = ProxySession::new(client, config, TcpDialer);
                if let Err(err) = session.run().await {
                    error!(%peer, "connection failed: {}", err);
                }
            });
        }
    }
}
