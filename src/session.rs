//! Per-connection orchestration: negotiation, request resolution, relay.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

use crate::{config::ServerConfig, dial::Dialer};

mod negotiation;
mod relay;
mod request;

/// One accepted client connection, driven through the SOCKS5 phases.
///
/// The session owns the client stream for its whole lifetime and the
/// destination stream from the moment the request phase dials it; both are
/// dropped, and therefore closed, on every exit path.
pub struct ProxySession<T, D> {
    client: T,
    config: Arc<ServerConfig>,
    dialer: D,
}

impl<T, D> ProxySession<T, D>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: Dialer,
{
    pub fn new(client: T, config: Arc<ServerConfig>, dialer: D) -> Self {
        ProxySession {
            client,
            config,
            dialer,
        }
    }

    /// Runs the connection to completion: method negotiation (with the
    /// optional password sub-negotiation), then the CONNECT request, then
    /// the relay. The first failing phase fails the whole connection.
    #[instrument(skip_all)]
    pub async fn run(mut self) -> crate::Result<()> {
        negotiation::negotiate(&mut self.client, self.config.as_ref()).await?;

        let target =
            request::resolve(&mut self.client, &self.dialer, self.config.as_ref()).await?;

        debug!("entering relay");
        relay::relay(self.client, target).await
    }
}
