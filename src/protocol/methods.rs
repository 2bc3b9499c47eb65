use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{protocol::VERSION, Socks5Error};

const NO_AUTH_REQUIRED: u8 = 0x00;
const GSSAPI: u8 = 0x01;
const USERNAME_PASSWORD: u8 = 0x02;

const IANA_ASSIGNED_LOWER: u8 = 0x03;
const IANA_ASSIGNED_UPPER: u8 = 0x7F;

const PRIVATE_METHOD_LOWER: u8 = 0x80;
const PRIVATE_METHOD_UPPER: u8 = 0xFE;

const NO_ACCEPTABLE_METHODS: u8 = 0xFF;

/// Authentication method identifiers from RFC 1928 section 3.
///
/// The server only ever selects [`AuthMethod::NoAuthRequired`] or
/// [`AuthMethod::UsernamePassword`]; everything else exists so offered
/// method lists decode losslessly.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AuthMethod {
    NoAuthRequired,
    Gssapi,
    UsernamePassword,
    IanaAssigned(u8),
    PrivateMethods(u8),
    NoAcceptableMethods,
}

impl AuthMethod {
    pub fn from_u8(value: u8) -> Self {
        match value {
            NO_AUTH_REQUIRED => AuthMethod::NoAuthRequired,
            GSSAPI => AuthMethod::Gssapi,
            USERNAME_PASSWORD => AuthMethod::UsernamePassword,
            IANA_ASSIGNED_LOWER..=IANA_ASSIGNED_UPPER => AuthMethod::IanaAssigned(value),
            PRIVATE_METHOD_LOWER..=PRIVATE_METHOD_UPPER => AuthMethod::PrivateMethods(value),
            _ => AuthMethod::NoAcceptableMethods,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            AuthMethod::NoAuthRequired => NO_AUTH_REQUIRED,
            AuthMethod::Gssapi => GSSAPI,
            AuthMethod::UsernamePassword => USERNAME_PASSWORD,
            AuthMethod::IanaAssigned(value) => value,
            AuthMethod::PrivateMethods(value) => value,
            AuthMethod::NoAcceptableMethods => NO_ACCEPTABLE_METHODS,
        }
    }
}

/// First message on a new connection: `VER NMETHODS METHODS`.
#[derive(Debug)]
pub struct MethodSelectionRequest {
    pub methods: Vec<AuthMethod>,
}

impl MethodSelectionRequest {
    /// Decodes the client's offered method list.
    ///
    /// `NMETHODS == 0` fails before any method bytes are read.
    pub async fn read<T>(conn: &mut T) -> crate::Result<Self>
    where
        T: AsyncRead + Unpin,
    {
        let mut header = [0u8; 2];
        conn.read_exact(&mut header).await?;

        if header[0] != VERSION {
            return Err(Socks5Error::VersionNotSupported(header[0]));
        }
        if header[1] == 0 {
            return Err(Socks5Error::NoMethodsDeclared);
        }

        let mut methods = vec![0u8; header[1] as usize];
        conn.read_exact(&mut methods).await?;

        Ok(MethodSelectionRequest {
            methods: methods.into_iter().map(AuthMethod::from_u8).collect(),
        })
    }

    pub fn contains(&self, method: AuthMethod) -> bool {
        self.methods.contains(&method)
    }
}

/// Server's answer to the method list: `VER METHOD`.
#[derive(Debug, Clone, Copy)]
pub struct MethodSelectionReply(pub AuthMethod);

impl MethodSelectionReply {
    pub async fn write<T>(&self, conn: &mut T) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        conn.write_all(&[VERSION, self.0.to_u8()]).await
    }
}
