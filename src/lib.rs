//! # Charon
//!
//! A small asynchronous SOCKS5 proxy server (RFC 1928/1929) built on tokio.
//!
//! The crate implements the server side of the protocol: method
//! negotiation, optional username/password sub-negotiation, CONNECT
//! request handling and the bidirectional relay. BIND and UDP ASSOCIATE
//! are rejected with a "command not supported" reply; GSSAPI is recognized
//! on the wire but can never be selected.
//!
//! ## Protocol flow
//!
//! 1. The client offers a list of authentication methods; the server picks
//!    the one its [`ServerConfig`] was built with, or answers `0xFF` and
//!    drops the connection.
//! 2. If the username/password method was selected, the RFC 1929
//!    sub-negotiation runs against the configured [`PasswordChecker`].
//! 3. The client sends a CONNECT request; the server dials the destination
//!    with a bounded timeout and reports the outbound socket's local
//!    address in its reply.
//! 4. Bytes are relayed in both directions until the client side finishes.
//!
//! ## Example
//!
//! ```no_run
//! use charon::{Server, ServerConfig};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let config = ServerConfig::builder().build()?;
//!     let server = Server::bind("127.0.0.1:1080", config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::io;

use thiserror::Error;

pub mod config;
pub mod dial;
pub mod protocol;
mod server;
mod session;

pub use config::{ConfigError, PasswordChecker, ServerConfig};
pub use dial::{Dialer, TcpDialer};
pub use server::Server;
pub use session::ProxySession;

use protocol::{Command, Reply};

pub type Result<T> = std::result::Result<T, Socks5Error>;

/// Everything that can end a SOCKS5 connection.
///
/// Protocol-validation failures each get their own variant so the phase
/// that hit them can pick the matching wire reply code; transport failures
/// funnel through [`Socks5Error::Io`].
#[derive(Error, Debug)]
pub enum Socks5Error {
    #[error("protocol version not supported: {0:#04x}")]
    VersionNotSupported(u8),
    #[error("sub-negotiation version not supported: {0:#04x}")]
    SubNegotiationVersionNotSupported(u8),
    #[error("no authentication methods declared")]
    NoMethodsDeclared,
    #[error("username length 0")]
    UsernameLengthZero,
    #[error("password length 0")]
    PasswordLengthZero,
    #[error("credentials were not valid utf-8")]
    CredentialsNotUtf8,
    #[error("domain name was not valid utf-8")]
    DomainNotUtf8,
    #[error("reserved field must be 0x00, got {0:#04x}")]
    InvalidReservedField(u8),
    #[error("unknown request command: {0:#04x}")]
    UnknownCommand(u8),
    #[error("unknown address type: {0:#04x}")]
    UnknownAddressType(u8),
    #[error("no acceptable authentication method")]
    MethodNotSupported,
    #[error("username or password rejected")]
    AuthenticationFailed,
    #[error("request command not supported: {0}")]
    CommandNotSupported(Command),
    #[error("destination address type rejected by policy")]
    AddressTypeRejected,
    #[error("connecting to destination failed: {0}")]
    ConnectionRefused(#[source] io::Error),
    #[error("network operation failed")]
    Io(#[from] io::Error),
}

impl Socks5Error {
    /// Wire reply code matching this error, for phases that answer the
    /// client before failing.
    pub fn reply_code(&self) -> Reply {
        match self {
            Socks5Error::UnknownCommand(_) | Socks5Error::CommandNotSupported(_) => {
                Reply::CommandNotSupported
            }
            Socks5Error::UnknownAddressType(_) | Socks5Error::AddressTypeRejected => {
                Reply::AddressTypeNotSupported
            }
            Socks5Error::ConnectionRefused(_) => Reply::ConnectionRefused,
            Socks5Error::Io(err) => err.kind().into(),
            _ => Reply::GeneralFailure,
        }
    }
}
