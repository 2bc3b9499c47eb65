use std::{fmt, io};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::protocol::{SocksSocketAddr, RESERVED, VERSION};

/// Reply codes from RFC 1928 section 6.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Success = 0x00,
    GeneralFailure = 0x01,
    ConnectionNotAllowedByRuleset = 0x02,
    NetworkUnreachable = 0x03,
    HostUnreachable = 0x04,
    ConnectionRefused = 0x05,
    TtlExpired = 0x06,
    CommandNotSupported = 0x07,
    AddressTypeNotSupported = 0x08,
}

impl Reply {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Reply::Success),
            0x01 => Some(Reply::GeneralFailure),
            0x02 => Some(Reply::ConnectionNotAllowedByRuleset),
            0x03 => Some(Reply::NetworkUnreachable),
            0x04 => Some(Reply::HostUnreachable),
            0x05 => Some(Reply::ConnectionRefused),
            0x06 => Some(Reply::TtlExpired),
            0x07 => Some(Reply::CommandNotSupported),
            0x08 => Some(Reply::AddressTypeNotSupported),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Reply::Success => "succeeded",
            Reply::GeneralFailure => "general SOCKS server failure",
            Reply::ConnectionNotAllowedByRuleset => "connection not allowed by ruleset",
            Reply::NetworkUnreachable => "network unreachable",
            Reply::HostUnreachable => "host unreachable",
            Reply::ConnectionRefused => "connection refused",
            Reply::TtlExpired => "TTL expired",
            Reply::CommandNotSupported => "command not supported",
            Reply::AddressTypeNotSupported => "address type not supported",
        };
        write!(f, "{}", description)
    }
}

impl From<io::ErrorKind> for Reply {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => Reply::ConnectionNotAllowedByRuleset,
            io::ErrorKind::ConnectionRefused => Reply::ConnectionRefused,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut => Reply::TtlExpired,
            io::ErrorKind::NotConnected => Reply::NetworkUnreachable,
            io::ErrorKind::NotFound
            | io::ErrorKind::AddrInUse
            | io::ErrorKind::UnexpectedEof => Reply::HostUnreachable,
            io::ErrorKind::AddrNotAvailable => Reply::AddressTypeNotSupported,
            io::ErrorKind::Unsupported => Reply::CommandNotSupported,
            _ => Reply::GeneralFailure,
        }
    }
}

/// Server's answer to a connection request:
/// `VER REP RSV ATYP BND.ADDR BND.PORT`.
///
/// On success `bound` is the local endpoint of the outbound connection;
/// on failure it is a zeroed endpoint echoing the request's address type.
#[derive(Debug, Clone)]
pub struct ConnectionReply {
    pub reply: Reply,
    pub bound: SocksSocketAddr,
}

impl ConnectionReply {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(22);
        bytes.push(VERSION);
        bytes.push(self.reply.to_u8());
        bytes.push(RESERVED);
        bytes.extend_from_slice(&self.bound.to_bytes());
        bytes
    }

    pub async fn write<T>(&self, conn: &mut T) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        conn.write_all(&self.to_bytes()).await
    }
}
