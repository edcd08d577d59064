//! Now-playing snapshots and their JSON wire format
//!
//! A snapshot is either [`NowPlayingSnapshot::Playing`] or
//! [`NowPlayingSnapshot::Idle`]. On the wire both share one object shape
//! discriminated by `is_playing`:
//!
//! ```json
//! {"is_playing": true, "track": {"name": "Song A", "artists": ["Artist X"], ...}}
//! {"is_playing": false, "message": "No track is currently playing"}
//! ```
//!
//! Serialization never escapes non-ASCII text (`serde_json` only escapes
//! control characters, quotes and backslashes).

use serde::{Deserialize, Serialize};

/// Idle message when the source reports no active playback
pub const NOTHING_PLAYING: &str = "No track is currently playing";
/// Idle message when playback is active but carries no track
pub const TRACK_UNAVAILABLE: &str = "Could not retrieve track information";
/// Idle message when the source query failed
pub const FETCH_FAILED: &str = "An error occurred while fetching track information";

/// Image of one artist of the current track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistImage {
    pub name: String,
    pub image: String,
}

/// Track currently playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub album_art: Option<String>,
    pub artist_images: Vec<ArtistImage>,
    pub duration_ms: u64,
    /// `null` when the player does not report a position
    pub progress_ms: Option<u64>,
    pub external_url: String,
}

/// Nothing to show, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleState {
    pub message: String,
    pub error: Option<String>,
}

/// Upstream playback state at one poll instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SnapshotWire", try_from = "SnapshotWire")]
pub enum NowPlayingSnapshot {
    Playing(TrackInfo),
    Idle(IdleState),
}

impl NowPlayingSnapshot {
    pub fn playing(track: TrackInfo) -> Self {
        Self::Playing(track)
    }

    /// Idle snapshot with an informational message
    pub fn idle(message: impl Into<String>) -> Self {
        Self::Idle(IdleState {
            message: message.into(),
            error: None,
        })
    }

    /// Idle snapshot describing a failed query
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Idle(IdleState {
            message: message.into(),
            error: Some(error.into()),
        })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        match self {
            Self::Playing(track) => Some(track),
            Self::Idle(_) => None,
        }
    }

    /// JSON payload pushed to clients
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// Flat wire shape shared by both variants
#[derive(Serialize, Deserialize)]
struct SnapshotWire {
    is_playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track: Option<TrackInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<NowPlayingSnapshot> for SnapshotWire {
    fn from(snapshot: NowPlayingSnapshot) -> Self {
        match snapshot {
            NowPlayingSnapshot::Playing(track) => Self {
                is_playing: true,
                track: Some(track),
                message: None,
                error: None,
            },
            NowPlayingSnapshot::Idle(IdleState { message, error }) => Self {
                is_playing: false,
                track: None,
                message: Some(message),
                error,
            },
        }
    }
}

impl TryFrom<SnapshotWire> for NowPlayingSnapshot {
    type Error = String;

    fn try_from(wire: SnapshotWire) -> Result<Self, Self::Error> {
        match (wire.is_playing, wire.track) {
            (true, Some(track)) => Ok(Self::Playing(track)),
            (true, None) => Err("`is_playing` is true but `track` is missing".to_string()),
            (false, _) => match wire.message {
                Some(message) if !message.is_empty() => Ok(Self::Idle(IdleState {
                    message,
                    error: wire.error,
                })),
                _ => Err("idle snapshot requires a non-empty `message`".to_string()),
            },
        }
    }
}
