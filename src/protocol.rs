//! Wire codecs for the SOCKS5 message types.
//!
//! Every decode reads exactly the bytes the format declares: the fixed
//! prefix first, then a freshly sized buffer per variable-length field.
//! Short reads surface as [`std::io::Error`]; field validation failures
//! surface as the named [`crate::Socks5Error`] variants.

pub mod addr;
pub mod command;
pub mod methods;
pub mod password;
pub mod reply;
pub mod request;

pub use addr::{Addr, AddressType, SocksSocketAddr};
pub use command::Command;
pub use methods::{AuthMethod, MethodSelectionReply, MethodSelectionRequest};
pub use password::{AuthStatus, PasswordReply, PasswordRequest};
pub use reply::{ConnectionReply, Reply};
pub use request::ConnectionRequest;

pub const VERSION: u8 = 0x05;
pub const RESERVED: u8 = 0x00;
