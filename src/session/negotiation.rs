//! Method selection and the optional RFC 1929 sub-negotiation.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument};

use crate::{
    config::{AuthPolicy, PasswordChecker, ServerConfig},
    protocol::{
        AuthMethod, AuthStatus, MethodSelectionReply, MethodSelectionRequest, PasswordReply,
        PasswordRequest,
    },
    Socks5Error,
};

/// Agrees on an authentication method with the client and, for the
/// password policy, verifies credentials against the configured checker.
#[instrument(skip_all)]
pub(crate) async fn negotiate<T>(conn: &mut T, config: &ServerConfig) -> crate::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    let offered = MethodSelectionRequest::read(conn).await?;

    let method = config.auth_method();
    if !offered.contains(method) {
        // Courtesy write; the method mismatch is the error either way.
        let _ = MethodSelectionReply(AuthMethod::NoAcceptableMethods)
            .write(conn)
            .await;
        return Err(Socks5Error::MethodNotSupported);
    }

    MethodSelectionReply(method).write(conn).await?;
    debug!(method = ?method, "authentication method selected");

    match config.policy() {
        AuthPolicy::NoAuth => Ok(()),
        AuthPolicy::Password(checker) => authenticate(conn, checker.as_ref()).await,
    }
}

async fn authenticate<T>(conn: &mut T, checker: &dyn PasswordChecker) -> crate::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    let request = PasswordRequest::read(conn).await?;

    if !checker.check(&request.username, &request.password) {
        let _ = PasswordReply(AuthStatus::Failure).write(conn).await;
        return Err(Socks5Error::AuthenticationFailed);
    }

    PasswordReply(AuthStatus::Success).write(conn).await?;
    debug!(username = %request.username, "password sub-negotiation succeeded");
    Ok(())
}
