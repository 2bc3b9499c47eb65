//! Request phase: parse the CONNECT request, apply policy, dial, reply.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

use crate::{
    config::ServerConfig,
    dial::Dialer,
    protocol::{
        Addr, AddressType, Command, ConnectionReply, ConnectionRequest, Reply, SocksSocketAddr,
    },
    Socks5Error,
};

/// Resolves the client's request into an established destination stream.
///
/// Policy and dial failures answer the client with the matching reply code
/// (best effort) before failing; decode failures send nothing because the
/// peer already broke framing.
#[instrument(skip_all)]
pub(crate) async fn resolve<T, D>(
    conn: &mut T,
    dialer: &D,
    config: &ServerConfig,
) -> crate::Result<D::Stream>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
    D: Dialer,
{
    let request = ConnectionRequest::read(conn).await?;
    let addr_type = request.addr.addr.addr_type();

    if request.command != Command::Connect {
        let err = Socks5Error::CommandNotSupported(request.command);
        let _ = reject(conn, err.reply_code(), addr_type).await;
        return Err(err);
    }

    if config.reject_ipv6() && matches!(request.addr.addr, Addr::Ipv6(_)) {
        let err = Socks5Error::AddressTypeRejected;
        let _ = reject(conn, err.reply_code(), addr_type).await;
        return Err(err);
    }

    let (target, local_addr) = match dialer
        .dial(request.addr.clone(), config.dial_timeout())
        .await
    {
        Ok(established) => established,
        Err(io_err) => {
            let err = Socks5Error::ConnectionRefused(io_err);
            let _ = reject(conn, err.reply_code(), addr_type).await;
            return Err(err);
        }
    };
    debug!(destination = %request.addr, "destination connected");

    let success = ConnectionReply {
        reply: Reply::Success,
        bound: local_addr.into(),
    };
    // An early return here drops `target`, closing the fresh connection.
    success.write(conn).await?;

    Ok(target)
}

async fn reject<T>(conn: &mut T, reply: Reply, addr_type: AddressType) -> io::Result<()>
where
    T: AsyncWrite + Unpin,
{
    ConnectionReply {
        reply,
        bound: SocksSocketAddr::zeroed(addr_type),
    }
    .write(conn)
    .await
}
