//! Push session transport seam

use crate::error::TransportError;
use async_trait::async_trait;

/// Message-oriented channel to one connected client
///
/// The disconnect signal is not part of this trait: transports cancel the
/// session's `CancellationToken` when their reader half sees the peer go.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Completes whatever handshake the transport needs before use
    async fn accept(&self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Writes one text message
    async fn send_text(&self, payload: &str) -> Result<(), TransportError>;
}
