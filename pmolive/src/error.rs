//! Error types for the live feed

use crate::registry::SubscriberId;

/// Result type alias for live feed operations
pub type Result<T> = std::result::Result<T, LiveError>;

/// Failure of a now-playing source query
///
/// Never reaches a client as an error: snapshot capture turns it into an
/// idle snapshot carrying the error text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network-level failure (connect, timeout, TLS...)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Credential missing, expired or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Upstream throttling
    #[error("Rate limited by upstream{}", .retry_after.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Upstream answered with an error status
    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Failure of a push transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone
    #[error("Connection closed")]
    Closed,

    /// The transport refused the session
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Writing a message failed
    #[error("Write failed: {0}")]
    Write(String),

    /// The write did not complete within the delivery timeout
    #[error("Write timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

/// Errors of the live feed
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// Upstream query failed (recovered inside snapshot capture)
    #[error("Source query failed: {0}")]
    SourceQuery(#[from] SourceError),

    /// Delivery to one subscriber failed; the subscriber must be evicted
    #[error("Delivery to subscriber {subscriber} failed: {source}")]
    DeliveryFailed {
        subscriber: SubscriberId,
        #[source]
        source: TransportError,
    },

    /// The client closed the channel
    #[error("Transport disconnected")]
    TransportDisconnected,

    /// Admission failed; nothing was registered
    #[error("Transport handshake failed: {0}")]
    Handshake(#[source] TransportError),

    /// A snapshot could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LiveError {
    pub fn delivery_failed(subscriber: SubscriberId, source: TransportError) -> Self {
        Self::DeliveryFailed { subscriber, source }
    }
}
