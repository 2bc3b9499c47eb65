//! Outbound-connection capability consumed by the request phase.

use std::{
    future::Future,
    io,
    net::{SocketAddr, SocketAddrV4, SocketAddrV6},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    time,
};

use crate::protocol::{Addr, SocksSocketAddr};

/// Opens the stream a CONNECT request asks for. Swapping the dialer is how
/// outbound traffic gets routed through something other than a plain TCP
/// connect, and how tests avoid real sockets.
pub trait Dialer: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Opens a stream to `addr`, bounded by `timeout`. Returns the stream
    /// together with its local bound address, which the success reply
    /// reports to the client.
    fn dial(
        &self,
        addr: SocksSocketAddr,
        timeout: Duration,
    ) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send;
}

/// Plain TCP dialer; domain names resolve through the system resolver.
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    async fn dial(
        &self,
        addr: SocksSocketAddr,
        timeout: Duration,
    ) -> io::Result<(TcpStream, SocketAddr)> {
        let connect = async {
            match addr.addr {
                Addr::Ipv4(addrv4) => {
                    TcpStream::connect(SocketAddrV4::new(addrv4, addr.port)).await
                }
                Addr::Ipv6(addrv6) => {
                    TcpStream::connect(SocketAddrV6::new(addrv6, addr.port, 0, 0)).await
                }
                Addr::Domain(ref domain) => {
                    TcpStream::connect((domain.as_str(), addr.port)).await
                }
            }
        };

        let stream = time::timeout(timeout, connect)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "dial timed out"))??;
        let local_addr = stream.local_addr()?;

        Ok((stream, local_addr))
    }
}
