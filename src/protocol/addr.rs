use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::Socks5Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Ipv4 = 0x01,
    DomainName = 0x03,
    Ipv6 = 0x04,
}

impl AddressType {
    pub fn from_u8(value: u8) -> crate::Result<Self> {
        match value {
            0x01 => Ok(AddressType::Ipv4),
            0x03 => Ok(AddressType::DomainName),
            0x04 => Ok(AddressType::Ipv6),
            _ => Err(Socks5Error::UnknownAddressType(value)),
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// A destination or bound endpoint: ATYP-selected address plus a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocksSocketAddr {
    pub port: u16,
    pub addr: Addr,
}

impl SocksSocketAddr {
    /// Reads `ADDR PORT` for an already-decoded address type. Each
    /// variable-length field goes into a buffer sized exactly to its
    /// declared length.
    pub(crate) async fn read<T>(conn: &mut T, addr_type: AddressType) -> crate::Result<Self>
    where
        T: AsyncRead + Unpin,
    {
        let addr = match addr_type {
            AddressType::Ipv4 => {
                let mut octets = [0u8; 4];
                conn.read_exact(&mut octets).await?;
                Addr::Ipv4(Ipv4Addr::from(octets))
            }
            AddressType::Ipv6 => {
                let mut octets = [0u8; 16];
                conn.read_exact(&mut octets).await?;
                Addr::Ipv6(Ipv6Addr::from(octets))
            }
            AddressType::DomainName => {
                let len = conn.read_u8().await?;
                let mut buf = vec![0u8; len as usize];
                conn.read_exact(&mut buf).await?;
                Addr::Domain(String::from_utf8(buf).map_err(|_| Socks5Error::DomainNotUtf8)?)
            }
        };

        let port = conn.read_u16().await?;

        Ok(SocksSocketAddr { port, addr })
    }

    /// Turns `Self` into: ATYP+ADDR+PORT. The address type written is the
    /// one of the value held here, never an echo of a request field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(19);

        bytes.push(self.addr.addr_type().to_u8());

        match &self.addr {
            Addr::Ipv4(addr) => bytes.extend_from_slice(&addr.octets()[..]),
            Addr::Ipv6(addr) => bytes.extend_from_slice(&addr.octets()[..]),
            Addr::Domain(domain) => {
                assert!(domain.len() < 256);
                bytes.push(domain.len() as u8);
                bytes.extend_from_slice(domain.as_bytes());
            }
        }
        bytes.extend_from_slice(&self.port.to_be_bytes());

        bytes
    }

    /// All-zero endpoint of the given type, used when a failure reply must
    /// echo the request's address type without a real bound address.
    pub(crate) fn zeroed(addr_type: AddressType) -> Self {
        let addr = match addr_type {
            AddressType::Ipv4 => Addr::Ipv4(Ipv4Addr::UNSPECIFIED),
            AddressType::Ipv6 => Addr::Ipv6(Ipv6Addr::UNSPECIFIED),
            AddressType::DomainName => Addr::Domain(String::new()),
        };
        SocksSocketAddr { port: 0, addr }
    }
}

impl From<SocketAddr> for SocksSocketAddr {
    fn from(value: SocketAddr) -> Self {
        match value {
            SocketAddr::V4(ipv4) => SocksSocketAddr {
                port: ipv4.port(),
                addr: Addr::Ipv4(*ipv4.ip()),
            },
            SocketAddr::V6(ipv6) => SocksSocketAddr {
                port: ipv6.port(),
                addr: Addr::Ipv6(*ipv6.ip()),
            },
        }
    }
}

impl fmt::Display for SocksSocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.addr {
            Addr::Ipv4(addr) => write!(f, "{}:{}", addr, self.port),
            Addr::Ipv6(addr) => write!(f, "[{}]:{}", addr, self.port),
            Addr::Domain(domain) => write!(f, "{}:{}", domain, self.port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addr {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Domain(String),
}

impl Addr {
    pub fn addr_type(&self) -> AddressType {
        match self {
            Addr::Ipv4(_) => AddressType::Ipv4,
            Addr::Ipv6(_) => AddressType::Ipv6,
            Addr::Domain(_) => AddressType::DomainName,
        }
    }
}
