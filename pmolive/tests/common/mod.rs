#![allow(dead_code)]

use async_trait::async_trait;
use pmolive::{
    AlbumRef, ArtistProfile, ArtistRef, NowPlayingSource, PlaybackState, PushTransport,
    SourceError, TrackItem, TransportError,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Delivery recorded by a [`MockTransport`]
#[derive(Debug, Clone)]
pub struct Delivery {
    pub at: Instant,
    pub payload: String,
}

impl Delivery {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload).expect("payload is JSON")
    }
}

/// In-memory transport forwarding every payload to a channel
pub struct MockTransport {
    tx: mpsc::UnboundedSender<Delivery>,
    successful_sends: Option<usize>,
    refuse_handshake: bool,
    stalled: bool,
    sent: AtomicUsize,
}

impl MockTransport {
    fn build(
        successful_sends: Option<usize>,
        refuse_handshake: bool,
        stalled: bool,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                successful_sends,
                refuse_handshake,
                stalled,
                sent: AtomicUsize::new(0),
            }),
            rx,
        )
    }

    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        Self::build(None, false, false)
    }

    /// Every write fails
    pub fn broken() -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        Self::build(Some(0), false, false)
    }

    /// The first `n` writes succeed, the following ones fail
    pub fn failing_after(n: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        Self::build(Some(n), false, false)
    }

    /// The handshake fails
    pub fn refusing() -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        Self::build(None, true, false)
    }

    /// The peer stops reading: every write hangs forever
    pub fn stalled() -> (Arc<Self>, mpsc::UnboundedReceiver<Delivery>) {
        Self::build(None, false, true)
    }

    pub fn attempts(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushTransport for MockTransport {
    async fn accept(&self) -> Result<(), TransportError> {
        if self.refuse_handshake {
            Err(TransportError::Handshake("upgrade refused".to_string()))
        } else {
            Ok(())
        }
    }

    async fn send_text(&self, payload: &str) -> Result<(), TransportError> {
        let attempt = self.sent.fetch_add(1, Ordering::SeqCst);
        if self.stalled {
            return std::future::pending().await;
        }
        if self.successful_sends.is_some_and(|n| attempt >= n) {
            return Err(TransportError::Closed);
        }
        self.tx
            .send(Delivery {
                at: Instant::now(),
                payload: payload.to_string(),
            })
            .map_err(|_| TransportError::Closed)
    }
}

/// Source returning the same answer on every query
pub struct ScriptedSource {
    playback: Result<Option<PlaybackState>, String>,
    queries: AtomicUsize,
}

impl ScriptedSource {
    pub fn playing(track: &str, artist: &str, progress_ms: u64, duration_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            playback: Ok(Some(PlaybackState {
                is_playing: true,
                progress_ms: Some(progress_ms),
                item: Some(TrackItem {
                    name: track.to_string(),
                    artists: vec![ArtistRef {
                        id: Some("artist-x".to_string()),
                        name: artist.to_string(),
                    }],
                    album: AlbumRef {
                        name: "Album".to_string(),
                        images: vec!["https://img/album".to_string()],
                    },
                    duration_ms,
                    external_url: "https://open.spotify.com/track/a".to_string(),
                }),
            })),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn nothing_playing() -> Arc<Self> {
        Arc::new(Self {
            playback: Ok(None),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            playback: Err(message.to_string()),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NowPlayingSource for ScriptedSource {
    async fn currently_playing(&self) -> Result<Option<PlaybackState>, SourceError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.playback.clone().map_err(SourceError::Http)
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile, SourceError> {
        Ok(ArtistProfile {
            name: artist_id.to_string(),
            images: vec![format!("https://img/{}", artist_id)],
        })
    }
}
