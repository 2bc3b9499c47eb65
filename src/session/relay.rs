//! Bidirectional byte pump between client and destination.

use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

/// Copies bytes both ways until the client-to-target direction finishes.
///
/// The target-to-client leg runs as its own task and is never awaited;
/// once the awaited leg ends (client EOF or error) the destination is shut
/// down and the other leg aborted, so both sockets close when this
/// returns. Only the awaited leg's error is surfaced.
#[instrument(skip_all)]
pub(crate) async fn relay<C, S>(client: C, target: S) -> crate::Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut client_read, mut client_write) = io::split(client);
    let (mut target_read, mut target_write) = io::split(target);

    let downstream = tokio::spawn(async move {
        let _ = io::copy(&mut target_read, &mut client_write).await;
    });

    let upstream = io::copy(&mut client_read, &mut target_write).await;

    let _ = target_write.shutdown().await;
    drop(target_write);
    downstream.abort();

    let sent = upstream?;
    debug!(bytes = sent, "client stream finished");
    Ok(())
}
