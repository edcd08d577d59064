//! Shared feed: one poll loop for the whole process
//!
//! Instead of one query per session, a single loop queries the source and
//! broadcasts the payload to every registry member. The loop sleeps while
//! nobody is connected. A joining subscriber receives the last broadcast
//! payload right away.

use crate::capture::SnapshotCapture;
use crate::error::{LiveError, Result};
use crate::publisher::{SessionOutcome, Termination};
use crate::registry::{Subscriber, SubscriberRegistry};
use crate::source::NowPlayingSource;
use crate::transport::PushTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct SharedFeed {
    registry: Arc<SubscriberRegistry>,
    source: Arc<dyn NowPlayingSource>,
    interval: Duration,
    cache_artist_images: bool,
    // Write-held while storing a payload and taking its recipient list,
    // read-held across admit + catch-up: a joiner is either a recipient or
    // caught up with that payload, never both.
    last_payload: RwLock<Option<String>>,
}

impl SharedFeed {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        source: Arc<dyn NowPlayingSource>,
        interval: Duration,
        cache_artist_images: bool,
    ) -> Self {
        Self {
            registry,
            source,
            interval,
            cache_artist_images,
            last_payload: RwLock::new(None),
        }
    }

    pub async fn last_payload(&self) -> Option<String> {
        self.last_payload.read().await.clone()
    }

    /// Poll loop, until `shutdown` is cancelled
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut capture = if self.cache_artist_images {
            SnapshotCapture::with_artist_cache(self.source.clone())
        } else {
            SnapshotCapture::new(self.source.clone())
        };
        info!(interval = ?self.interval, "Shared now-playing feed started");

        loop {
            if self.registry.is_empty().await {
                *self.last_payload.write().await = None;
                debug!("No subscriber, shared feed idle");
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = self.registry.wait_non_empty() => {}
                }
            }

            let snapshot = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                snapshot = capture.capture() => snapshot,
            };

            match snapshot.to_json() {
                Ok(payload) => {
                    let recipients = {
                        let mut last = self.last_payload.write().await;
                        *last = Some(payload.clone());
                        self.registry.members().await
                    };
                    let report = self.registry.broadcast_to(recipients, &payload).await;
                    debug!(
                        delivered = report.delivered.len(),
                        evicted = report.evicted.len(),
                        "Snapshot broadcast"
                    );
                }
                Err(e) => error!("Failed to serialize snapshot: {}", e),
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Shared now-playing feed stopped");
    }

    /// Admits a subscriber and sends it the last payload
    pub async fn join(&self, transport: Arc<dyn PushTransport>) -> Result<(Subscriber, bool)> {
        let last = self.last_payload.read().await;
        let subscriber = self.registry.admit(transport).await?;

        let Some(payload) = last.as_deref() else {
            return Ok((subscriber, false));
        };
        match self.registry.send_to(&subscriber, payload).await {
            Ok(()) => Ok((subscriber, true)),
            Err(e) => {
                drop(last);
                self.registry.evict(&subscriber).await;
                Err(e)
            }
        }
    }

    /// Serves one session: join, then wait for disconnect or eviction
    ///
    /// Only handshake failures are returned as errors.
    pub async fn serve(
        &self,
        transport: Arc<dyn PushTransport>,
        disconnect: CancellationToken,
    ) -> Result<SessionOutcome> {
        let (subscriber, deliveries) = match self.join(transport).await {
            Ok((subscriber, caught_up)) => (subscriber, u64::from(caught_up)),
            Err(LiveError::DeliveryFailed { subscriber, source }) => {
                warn!(subscriber = %subscriber, "Catch-up delivery failed: {}", source);
                return Ok(SessionOutcome {
                    subscriber,
                    reason: Termination::DeliveryFailed,
                    deliveries: 0,
                });
            }
            Err(e) => return Err(e),
        };

        let reason = tokio::select! {
            _ = disconnect.cancelled() => Termination::Disconnected,
            _ = self.registry.wait_evicted(&subscriber) => Termination::DeliveryFailed,
        };

        self.registry.evict(&subscriber).await;
        info!(subscriber = %subscriber, reason = ?reason, "Shared session ended");

        Ok(SessionOutcome {
            subscriber,
            reason,
            deliveries,
        })
    }
}
