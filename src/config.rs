//! Per-server policy: which authentication method to serve, how to verify
//! credentials, and the request-phase knobs.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;

use crate::protocol::AuthMethod;

const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Verifies a username/password pair during the RFC 1929 sub-negotiation.
///
/// Checkers are consulted once per connection and may be called from many
/// connections at once; the proxy never stores credentials itself.
pub trait PasswordChecker: Send + Sync {
    fn check(&self, username: &str, password: &str) -> bool;
}

impl<F> PasswordChecker for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn check(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("username/password method selected but no password checker set")]
    PasswordCheckerMissing,
    #[error("authentication method {0:#04x} cannot be served")]
    MethodNotServable(u8),
}

/// Which sub-negotiation the server runs after method selection. Built by
/// [`ServerConfigBuilder::build`], so a password policy always carries its
/// checker.
#[derive(Clone)]
pub(crate) enum AuthPolicy {
    NoAuth,
    Password(Arc<dyn PasswordChecker>),
}

/// Read-only configuration shared by every connection.
#[derive(Clone)]
pub struct ServerConfig {
    policy: AuthPolicy,
    reject_ipv6: bool,
    dial_timeout: Duration,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            auth_method: AuthMethod::NoAuthRequired,
            password_checker: None,
            reject_ipv6: true,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }

    pub fn auth_method(&self) -> AuthMethod {
        match self.policy {
            AuthPolicy::NoAuth => AuthMethod::NoAuthRequired,
            AuthPolicy::Password(_) => AuthMethod::UsernamePassword,
        }
    }

    pub(crate) fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    pub fn reject_ipv6(&self) -> bool {
        self.reject_ipv6
    }

    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("auth_method", &self.auth_method())
            .field("reject_ipv6", &self.reject_ipv6)
            .field("dial_timeout", &self.dial_timeout)
            .finish()
    }
}

pub struct ServerConfigBuilder {
    auth_method: AuthMethod,
    password_checker: Option<Arc<dyn PasswordChecker>>,
    reject_ipv6: bool,
    dial_timeout: Duration,
}

impl ServerConfigBuilder {
    /// Method the server will select during negotiation. Only
    /// `NoAuthRequired` and `UsernamePassword` are servable.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    pub fn password_checker(mut self, checker: impl PasswordChecker + 'static) -> Self {
        self.password_checker = Some(Arc::new(checker));
        self
    }

    /// IPv6 destinations are refused with an "address type not supported"
    /// reply when set. On by default.
    pub fn reject_ipv6(mut self, reject: bool) -> Self {
        self.reject_ipv6 = reject;
        self
    }

    /// Bound on dialing the destination in the request phase.
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let policy = match self.auth_method {
            AuthMethod::NoAuthRequired => AuthPolicy::NoAuth,
            AuthMethod::UsernamePassword => AuthPolicy::Password(
                self.password_checker
                    .ok_or(ConfigError::PasswordCheckerMissing)?,
            ),
            other => return Err(ConfigError::MethodNotServable(other.to_u8())),
        };

        Ok(ServerConfig {
            policy,
            reject_ipv6: self.reject_ipv6,
            dial_timeout: self.dial_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_auth() {
        let config = ServerConfig::builder().build().unwrap();
        assert_eq!(config.auth_method(), AuthMethod::NoAuthRequired);
        assert!(config.reject_ipv6());
        assert_eq!(config.dial_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn password_method_requires_a_checker() {
        let err = ServerConfig::builder()
            .auth_method(AuthMethod::UsernamePassword)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::PasswordCheckerMissing));
    }

    #[test]
    fn password_method_with_checker_builds() {
        let config = ServerConfig::builder()
            .auth_method(AuthMethod::UsernamePassword)
            .password_checker(|user: &str, pass: &str| user == "admin" && pass == "123456")
            .build()
            .unwrap();
        assert_eq!(config.auth_method(), AuthMethod::UsernamePassword);
    }

    #[test]
    fn gssapi_is_never_servable() {
        let err = ServerConfig::builder()
            .auth_method(AuthMethod::Gssapi)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MethodNotServable(0x01)));
    }
}
