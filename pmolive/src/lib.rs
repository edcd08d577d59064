//! Live "now playing" feed
//!
//! This crate turns a slow, rate-limited upstream poll into a push feed for
//! any number of connected clients.
//!
//! # Components
//!
//! - [`SubscriberRegistry`]: the set of connected push clients, with
//!   idempotent eviction, single-target delivery and a self-healing
//!   broadcast
//! - [`PollingPublisher`]: one query/deliver/sleep loop per push session,
//!   cancelled as soon as the client disconnects
//! - [`SharedFeed`]: a single loop for the whole process, broadcasting to
//!   every member
//! - [`LiveFeed`]: the facade transports and HTTP handlers talk to
//!
//! The upstream provider sits behind [`NowPlayingSource`] and the client
//! connection behind [`PushTransport`]. Source failures never close a
//! session: they are delivered as idle snapshots carrying the error text.
//!
//! # Example
//!
//! ```rust,ignore
//! use pmolive::{LiveFeed, LiveOptions};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let feed = LiveFeed::new(Arc::new(my_source), LiveOptions::default());
//!
//! // On demand
//! let snapshot = feed.snapshot().await;
//! println!("{}", snapshot.to_json()?);
//!
//! // Push: runs until `disconnect` is cancelled or a delivery fails
//! let outcome = feed.serve(transport, disconnect).await?;
//! ```
//!
//! # Features
//!
//! - `pmoconfig` (default): [`LiveConfigExt`] reads the `live.*` settings
//! - `pmoserver`: WebSocket transport and the `/ws` + `/current-track`
//!   routes through [`LiveFeedExt`]

pub mod capture;
pub mod error;
pub mod feed;
pub mod publisher;
pub mod registry;
pub mod shared;
pub mod snapshot;
pub mod source;
pub mod transport;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "pmoserver")]
pub mod api_rest;
#[cfg(feature = "pmoserver")]
pub mod pmoserver_ext;
#[cfg(feature = "pmoserver")]
mod pmoserver_impl;
#[cfg(feature = "pmoserver")]
pub mod ws;

pub use capture::{ArtistImageCache, SnapshotCapture};
pub use error::{LiveError, Result, SourceError, TransportError};
pub use feed::{DEFAULT_POLL_INTERVAL, FeedMode, LiveFeed, LiveOptions};
pub use publisher::{PollingPublisher, SessionOutcome, Termination};
pub use registry::{
    BroadcastReport, DEFAULT_DELIVERY_TIMEOUT, Member, RegistryEvent, Subscriber, SubscriberId,
    SubscriberRegistry,
};
pub use shared::SharedFeed;
pub use snapshot::{
    ArtistImage, FETCH_FAILED, IdleState, NOTHING_PLAYING, NowPlayingSnapshot, TRACK_UNAVAILABLE,
    TrackInfo,
};
pub use source::{AlbumRef, ArtistProfile, ArtistRef, NowPlayingSource, PlaybackState, TrackItem};
pub use transport::PushTransport;

#[cfg(feature = "pmoconfig")]
pub use config_ext::LiveConfigExt;

#[cfg(feature = "pmoserver")]
pub use pmoserver_ext::{LiveFeedExt, LiveState};
#[cfg(feature = "pmoserver")]
pub use ws::WebSocketTransport;
