//! RFC 1929 username/password sub-negotiation messages.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Socks5Error;

const SUB_NEGOTIATION_VERSION: u8 = 0x01;

/// `VER ULEN UNAME PLEN PASSWD`; both fields are 1..=255 bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct PasswordRequest {
    pub username: String,
    pub password: String,
}

impl PasswordRequest {
    pub async fn read<T>(conn: &mut T) -> crate::Result<Self>
    where
        T: AsyncRead + Unpin,
    {
        let version = conn.read_u8().await?;
        if version != SUB_NEGOTIATION_VERSION {
            return Err(Socks5Error::SubNegotiationVersionNotSupported(version));
        }

        let username = read_field(conn, Socks5Error::UsernameLengthZero).await?;
        let password = read_field(conn, Socks5Error::PasswordLengthZero).await?;

        Ok(PasswordRequest { username, password })
    }

    /// Turns `Self` into: VER+ULEN+UNAME+PLEN+PASSWD.
    pub fn to_bytes(&self) -> Vec<u8> {
        assert!(self.username.len() < 256);
        assert!(self.password.len() < 256);

        let mut bytes = Vec::with_capacity(3 + self.username.len() + self.password.len());
        bytes.push(SUB_NEGOTIATION_VERSION);
        bytes.push(self.username.len() as u8);
        bytes.extend_from_slice(self.username.as_bytes());
        bytes.push(self.password.len() as u8);
        bytes.extend_from_slice(self.password.as_bytes());
        bytes
    }
}

/// Reads one length-prefixed credential field into an exactly sized buffer.
async fn read_field<T>(conn: &mut T, on_empty: Socks5Error) -> crate::Result<String>
where
    T: AsyncRead + Unpin,
{
    let len = conn.read_u8().await?;
    if len == 0 {
        return Err(on_empty);
    }

    let mut buf = vec![0u8; len as usize];
    conn.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|_| Socks5Error::CredentialsNotUtf8)
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Success = 0x00,
    Failure = 0x01,
}

/// `VER STATUS`; a nonzero status tells the client to close.
#[derive(Debug, Clone, Copy)]
pub struct PasswordReply(pub AuthStatus);

impl PasswordReply {
    pub async fn write<T>(&self, conn: &mut T) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        conn.write_all(&[SUB_NEGOTIATION_VERSION, self.0 as u8]).await
    }
}
