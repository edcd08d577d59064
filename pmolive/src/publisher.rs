//! Per-session polling publisher
//!
//! One publisher drives one push session: query, serialize, deliver, sleep,
//! repeat. Every wait in the loop races the session's
//! [`CancellationToken`], so a disconnect ends the loop at once, even while
//! a write to an unresponsive client is pending.
//!
//! Source failures never end a session (capture turns them into idle
//! snapshots). A session ends on disconnect, on a failed delivery, or on a
//! snapshot that cannot be serialized. The subscriber is evicted exactly
//! once, when the loop ends.

use crate::capture::SnapshotCapture;
use crate::error::LiveError;
use crate::registry::{Subscriber, SubscriberRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The client went away (or the server is shutting down)
    Disconnected,
    /// A write to the client failed
    DeliveryFailed,
    /// Unrecoverable error inside the session
    Fatal(String),
}

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub subscriber: Subscriber,
    pub reason: Termination,
    /// Messages this session task delivered
    pub deliveries: u64,
}

pub struct PollingPublisher {
    registry: Arc<SubscriberRegistry>,
    subscriber: Subscriber,
    capture: SnapshotCapture,
    interval: Duration,
    cancel: CancellationToken,
}

impl PollingPublisher {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        subscriber: Subscriber,
        capture: SnapshotCapture,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            subscriber,
            capture,
            interval,
            cancel,
        }
    }

    /// Runs the session until it terminates
    pub async fn run(mut self) -> SessionOutcome {
        let subscriber = self.subscriber;
        let mut deliveries = 0u64;
        info!(subscriber = %subscriber, interval = ?self.interval, "Polling session started");

        let reason = loop {
            let snapshot = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Termination::Disconnected,
                snapshot = self.capture.capture() => snapshot,
            };

            let payload = match snapshot.to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    let e = LiveError::from(e);
                    error!(subscriber = %subscriber, "{}", e);
                    break Termination::Fatal(e.to_string());
                }
            };

            let delivered = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Termination::Disconnected,
                delivered = self.registry.send_to(&subscriber, &payload) => delivered,
            };
            if let Err(e) = delivered {
                if self.cancel.is_cancelled() {
                    break Termination::Disconnected;
                }
                warn!(subscriber = %subscriber, "{}", e);
                break Termination::DeliveryFailed;
            }
            deliveries += 1;
            debug!(subscriber = %subscriber, playing = snapshot.is_playing(), "Snapshot delivered");

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Termination::Disconnected,
                _ = tokio::time::sleep(self.interval) => {}
            }
        };

        self.registry.evict(&subscriber).await;
        info!(subscriber = %subscriber, reason = ?reason, deliveries, "Polling session ended");

        SessionOutcome {
            subscriber,
            reason,
            deliveries,
        }
    }
}
