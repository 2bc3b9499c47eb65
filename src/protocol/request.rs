use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    protocol::{AddressType, Command, SocksSocketAddr, RESERVED, VERSION},
    Socks5Error,
};

/// Client connection request: `VER CMD RSV ATYP DST.ADDR DST.PORT`.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    pub command: Command,
    pub addr: SocksSocketAddr,
}

impl ConnectionRequest {
    /// Decodes and validates a request.
    ///
    /// The whole fixed prefix is validated before any address bytes are
    /// consumed, so an unknown address type fails with the address still
    /// unread on the wire.
    pub async fn read<T>(conn: &mut T) -> crate::Result<Self>
    where
        T: AsyncRead + Unpin,
    {
        let mut header = [0u8; 4];
        conn.read_exact(&mut header).await?;

        if header[0] != VERSION {
            return Err(Socks5Error::VersionNotSupported(header[0]));
        }
        let command = Command::from_u8(header[1]).ok_or(Socks5Error::UnknownCommand(header[1]))?;
        if header[2] != RESERVED {
            return Err(Socks5Error::InvalidReservedField(header[2]));
        }
        let addr_type = AddressType::from_u8(header[3])?;

        let addr = SocksSocketAddr::read(conn, addr_type).await?;

        Ok(ConnectionRequest { command, addr })
    }
}
