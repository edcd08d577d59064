//! The now-playing source seam
//!
//! A source answers two questions: what is playing right now, and what does
//! an artist look like. The types below carry only the fields a snapshot
//! needs; provider crates map their own models onto them.

use crate::error::SourceError;
use async_trait::async_trait;

/// Reference to an artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRef {
    /// Provider id, absent for local files
    pub id: Option<String>,
    pub name: String,
}

/// Album of a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumRef {
    pub name: String,
    /// Image URLs, largest first
    pub images: Vec<String>,
}

/// Track item of a playback state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackItem {
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    pub duration_ms: u64,
    pub external_url: String,
}

/// Raw playback state reported by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    /// `None` when the provider cannot describe the item (ads, podcasts...)
    pub item: Option<TrackItem>,
}

/// Artist details used for image enrichment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistProfile {
    pub name: String,
    /// Image URLs, largest first
    pub images: Vec<String>,
}

/// Provider of the currently playing track
#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    /// Current playback, `None` when nothing is playing at all
    async fn currently_playing(&self) -> Result<Option<PlaybackState>, SourceError>;

    /// Details of one artist
    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile, SourceError>;
}
