//! One poll cycle: query the source and build a snapshot
//!
//! Capture never fails. Any [`SourceError`], including a failed artist
//! lookup, becomes an idle snapshot carrying [`FETCH_FAILED`] and the error
//! text.

use crate::error::SourceError;
use crate::snapshot::{
    ArtistImage, FETCH_FAILED, NOTHING_PLAYING, NowPlayingSnapshot, TRACK_UNAVAILABLE, TrackInfo,
};
use crate::source::{NowPlayingSource, TrackItem};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// First image of each artist already looked up, keyed by artist id
#[derive(Debug, Default)]
pub struct ArtistImageCache {
    images: HashMap<String, Option<String>>,
}

impl ArtistImageCache {
    pub fn get(&self, artist_id: &str) -> Option<&Option<String>> {
        self.images.get(artist_id)
    }

    pub fn insert(&mut self, artist_id: impl Into<String>, image: Option<String>) {
        self.images.insert(artist_id.into(), image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Builds snapshots from a [`NowPlayingSource`]
///
/// A capture belongs to one session; its artist cache lives and dies with it.
pub struct SnapshotCapture {
    source: Arc<dyn NowPlayingSource>,
    artist_images: Option<ArtistImageCache>,
}

impl SnapshotCapture {
    /// Capture that looks artists up on every poll
    pub fn new(source: Arc<dyn NowPlayingSource>) -> Self {
        Self {
            source,
            artist_images: None,
        }
    }

    /// Capture that remembers artist images between polls
    pub fn with_artist_cache(source: Arc<dyn NowPlayingSource>) -> Self {
        Self {
            source,
            artist_images: Some(ArtistImageCache::default()),
        }
    }

    pub fn artist_cache(&self) -> Option<&ArtistImageCache> {
        self.artist_images.as_ref()
    }

    /// Runs one query and converts the outcome into a snapshot
    pub async fn capture(&mut self) -> NowPlayingSnapshot {
        match self.try_capture().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Now-playing query failed: {}", e);
                NowPlayingSnapshot::failed(FETCH_FAILED, e.to_string())
            }
        }
    }

    async fn try_capture(&mut self) -> Result<NowPlayingSnapshot, SourceError> {
        let state = match self.source.currently_playing().await? {
            Some(state) if state.is_playing => state,
            _ => return Ok(NowPlayingSnapshot::idle(NOTHING_PLAYING)),
        };

        let Some(item) = state.item else {
            return Ok(NowPlayingSnapshot::idle(TRACK_UNAVAILABLE));
        };

        let artist_images = self.lookup_artist_images(&item).await?;

        Ok(NowPlayingSnapshot::playing(TrackInfo {
            artists: item.artists.iter().map(|a| a.name.clone()).collect(),
            album_art: item.album.images.first().cloned(),
            album: item.album.name,
            artist_images,
            duration_ms: item.duration_ms,
            progress_ms: state.progress_ms,
            external_url: item.external_url,
            name: item.name,
        }))
    }

    // Artists without an id or without images are left out
    async fn lookup_artist_images(&mut self, item: &TrackItem) -> Result<Vec<ArtistImage>, SourceError> {
        let mut images = Vec::with_capacity(item.artists.len());

        for artist in &item.artists {
            let Some(id) = artist.id.as_deref() else {
                continue;
            };

            let image = match self.artist_images.as_ref().and_then(|c| c.get(id)) {
                Some(cached) => cached.clone(),
                None => {
                    debug!(artist_id = id, "Looking up artist");
                    let image = self.source.artist(id).await?.images.into_iter().next();
                    if let Some(cache) = self.artist_images.as_mut() {
                        cache.insert(id, image.clone());
                    }
                    image
                }
            };

            if let Some(image) = image {
                images.push(ArtistImage {
                    name: artist.name.clone(),
                    image,
                });
            }
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AlbumRef, ArtistProfile, ArtistRef, PlaybackState};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        playback: Mutex<Result<Option<PlaybackState>, String>>,
        artist_images: HashMap<String, Vec<String>>,
        artist_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(playback: Result<Option<PlaybackState>, String>) -> Self {
            Self {
                playback: Mutex::new(playback),
                artist_images: HashMap::new(),
                artist_calls: AtomicUsize::new(0),
            }
        }

        fn with_artist(mut self, id: &str, images: &[&str]) -> Self {
            self.artist_images
                .insert(id.to_string(), images.iter().map(|s| s.to_string()).collect());
            self
        }
    }

    #[async_trait]
    impl NowPlayingSource for FakeSource {
        async fn currently_playing(&self) -> Result<Option<PlaybackState>, SourceError> {
            self.playback
                .lock()
                .unwrap()
                .clone()
                .map_err(SourceError::Http)
        }

        async fn artist(&self, artist_id: &str) -> Result<ArtistProfile, SourceError> {
            self.artist_calls.fetch_add(1, Ordering::SeqCst);
            self.artist_images
                .get(artist_id)
                .map(|images| ArtistProfile {
                    name: artist_id.to_string(),
                    images: images.clone(),
                })
                .ok_or_else(|| SourceError::Upstream(format!("unknown artist {}", artist_id)))
        }
    }

    fn playing(artists: Vec<ArtistRef>) -> PlaybackState {
        PlaybackState {
            is_playing: true,
            progress_ms: Some(1_000),
            item: Some(TrackItem {
                name: "Song A".to_string(),
                artists,
                album: AlbumRef {
                    name: "Album".to_string(),
                    images: vec!["https://img/album-640".to_string(), "https://img/album-64".to_string()],
                },
                duration_ms: 200_000,
                external_url: "https://open.spotify.com/track/a".to_string(),
            }),
        }
    }

    fn artist(id: Option<&str>, name: &str) -> ArtistRef {
        ArtistRef {
            id: id.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_playing_track_snapshot() {
        let source = Arc::new(
            FakeSource::new(Ok(Some(playing(vec![artist(Some("x"), "Artist X")]))))
                .with_artist("x", &["https://img/x"]),
        );
        let mut capture = SnapshotCapture::new(source);

        let snapshot = capture.capture().await;
        let track = snapshot.track().expect("playing snapshot");
        assert_eq!(track.name, "Song A");
        assert_eq!(track.artists, vec!["Artist X"]);
        assert_eq!(track.progress_ms, Some(1_000));
        assert_eq!(track.duration_ms, 200_000);
        assert_eq!(track.album_art.as_deref(), Some("https://img/album-640"));
        assert_eq!(
            track.artist_images,
            vec![ArtistImage {
                name: "Artist X".to_string(),
                image: "https://img/x".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_nothing_playing() {
        let mut capture = SnapshotCapture::new(Arc::new(FakeSource::new(Ok(None))));
        assert_eq!(
            capture.capture().await,
            NowPlayingSnapshot::idle(NOTHING_PLAYING)
        );

        let mut paused = playing(vec![]);
        paused.is_playing = false;
        let mut capture = SnapshotCapture::new(Arc::new(FakeSource::new(Ok(Some(paused)))));
        assert_eq!(
            capture.capture().await,
            NowPlayingSnapshot::idle(NOTHING_PLAYING)
        );
    }

    #[tokio::test]
    async fn test_unknown_progress_is_kept() {
        let state = PlaybackState {
            progress_ms: None,
            ..playing(vec![artist(None, "Artist X")])
        };
        let mut capture = SnapshotCapture::new(Arc::new(FakeSource::new(Ok(Some(state)))));
        let snapshot = capture.capture().await;
        assert_eq!(snapshot.track().expect("playing snapshot").progress_ms, None);
    }

    #[tokio::test]
    async fn test_missing_item() {
        let state = PlaybackState {
            is_playing: true,
            progress_ms: Some(10),
            item: None,
        };
        let mut capture = SnapshotCapture::new(Arc::new(FakeSource::new(Ok(Some(state)))));
        assert_eq!(
            capture.capture().await,
            NowPlayingSnapshot::idle(TRACK_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn test_source_error_degrades() {
        let mut capture =
            SnapshotCapture::new(Arc::new(FakeSource::new(Err("connection reset".to_string()))));
        assert_eq!(
            capture.capture().await,
            NowPlayingSnapshot::failed(FETCH_FAILED, "HTTP request failed: connection reset")
        );
    }

    #[tokio::test]
    async fn test_artist_error_degrades() {
        let source = FakeSource::new(Ok(Some(playing(vec![artist(Some("ghost"), "Ghost")]))));
        let mut capture = SnapshotCapture::new(Arc::new(source));

        match capture.capture().await {
            NowPlayingSnapshot::Idle(idle) => {
                assert_eq!(idle.message, FETCH_FAILED);
                assert!(idle.error.unwrap().contains("unknown artist ghost"));
            }
            other => panic!("expected idle snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_artists_without_id_or_image_are_skipped() {
        let source = FakeSource::new(Ok(Some(playing(vec![
            artist(None, "Local Artist"),
            artist(Some("bare"), "Bare"),
            artist(Some("x"), "Artist X"),
        ]))))
        .with_artist("bare", &[])
        .with_artist("x", &["https://img/x-640", "https://img/x-64"]);
        let mut capture = SnapshotCapture::new(Arc::new(source));

        let snapshot = capture.capture().await;
        let track = snapshot.track().unwrap();
        assert_eq!(track.artists, vec!["Local Artist", "Bare", "Artist X"]);
        assert_eq!(track.artist_images.len(), 1);
        assert_eq!(track.artist_images[0].image, "https://img/x-640");
    }

    #[tokio::test]
    async fn test_artist_cache_avoids_repeated_lookups() {
        let source = Arc::new(
            FakeSource::new(Ok(Some(playing(vec![
                artist(Some("x"), "Artist X"),
                artist(Some("bare"), "Bare"),
            ]))))
            .with_artist("x", &["https://img/x"])
            .with_artist("bare", &[]),
        );

        let mut cached = SnapshotCapture::with_artist_cache(source.clone());
        let first = cached.capture().await;
        let second = cached.capture().await;
        assert_eq!(first, second);
        assert_eq!(source.artist_calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.artist_cache().map(ArtistImageCache::len), Some(2));

        let mut uncached = SnapshotCapture::new(source.clone());
        uncached.capture().await;
        uncached.capture().await;
        assert_eq!(source.artist_calls.load(Ordering::SeqCst), 6);
    }
}
