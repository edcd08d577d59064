//! Live feed facade
//!
//! [`LiveFeed`] ties a source, a registry and the delivery strategy
//! together. Transports hand their sessions to [`LiveFeed::serve`]; the
//! on-demand endpoint calls [`LiveFeed::snapshot`].

use crate::capture::SnapshotCapture;
use crate::error::Result;
use crate::publisher::{PollingPublisher, SessionOutcome};
use crate::registry::{DEFAULT_DELIVERY_TIMEOUT, SubscriberRegistry};
use crate::shared::SharedFeed;
use crate::snapshot::NowPlayingSnapshot;
use crate::source::NowPlayingSource;
use crate::transport::PushTransport;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Interval between the end of a delivery and the next query
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delivery strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedMode {
    /// One poll loop per session, delivering to that session only
    #[default]
    PerSession,
    /// One poll loop for the process, broadcasting to every session
    Shared,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerSession => "per_session",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_session" => Ok(Self::PerSession),
            "shared" => Ok(Self::Shared),
            other => Err(format!(
                "Unknown feed mode '{}' (expected 'per_session' or 'shared')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveOptions {
    pub poll_interval: Duration,
    pub mode: FeedMode,
    /// Remember artist images across polls of one loop
    pub cache_artist_images: bool,
    /// Longest a single write may take before the subscriber is evicted
    pub delivery_timeout: Duration,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            mode: FeedMode::default(),
            cache_artist_images: true,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

pub struct LiveFeed {
    source: Arc<dyn NowPlayingSource>,
    registry: Arc<SubscriberRegistry>,
    options: LiveOptions,
    shared: Option<Arc<SharedFeed>>,
}

impl LiveFeed {
    pub fn new(source: Arc<dyn NowPlayingSource>, options: LiveOptions) -> Self {
        let registry = Arc::new(SubscriberRegistry::with_delivery_timeout(
            options.delivery_timeout,
        ));
        let shared = (options.mode == FeedMode::Shared).then(|| {
            Arc::new(SharedFeed::new(
                registry.clone(),
                source.clone(),
                options.poll_interval,
                options.cache_artist_images,
            ))
        });

        Self {
            source,
            registry,
            options,
            shared,
        }
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &LiveOptions {
        &self.options
    }

    /// One snapshot, computed like a single poll cycle
    pub async fn snapshot(&self) -> NowPlayingSnapshot {
        SnapshotCapture::new(self.source.clone()).capture().await
    }

    /// Spawns the shared poll loop (shared mode only)
    pub fn start(&self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        let shared = self.shared.clone()?;
        Some(tokio::spawn(async move { shared.run(shutdown).await }))
    }

    /// Serves one push session until it terminates
    ///
    /// `disconnect` is cancelled by the transport when the client goes away.
    /// Only a failed handshake is returned as an error.
    pub async fn serve(
        &self,
        transport: Arc<dyn PushTransport>,
        disconnect: CancellationToken,
    ) -> Result<SessionOutcome> {
        if let Some(shared) = &self.shared {
            return shared.serve(transport, disconnect).await;
        }

        let subscriber = self.registry.admit(transport).await?;
        let capture = if self.options.cache_artist_images {
            SnapshotCapture::with_artist_cache(self.source.clone())
        } else {
            SnapshotCapture::new(self.source.clone())
        };

        let publisher = PollingPublisher::new(
            self.registry.clone(),
            subscriber,
            capture,
            self.options.poll_interval,
            disconnect,
        );
        Ok(publisher.run().await)
    }
}
