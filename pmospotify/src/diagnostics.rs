//! Connectivity diagnostics
//!
//! Runs three independent probes against the Web API (profile, current
//! track, history). A failing probe is recorded in `errors` and does not
//! prevent the others from running.

use crate::client::SpotifyClient;
use crate::error::SpotifyError;
use crate::models::{CurrentlyPlaying, PlayHistory, User};
use serde::Serialize;
use tracing::{debug, warn};

/// Placeholder when the profile omits a field
const NOT_AVAILABLE: &str = "N/A";

/// Text reported when the player is inactive
pub const NO_TRACK_PLAYING: &str = "No track currently playing";

/// Number of history entries probed
pub const RECENT_TRACKS_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub display_name: Option<String>,
    pub email: String,
    pub country: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            email: user.email.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            country: user.country.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub is_playing: bool,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub progress_ms: Option<u64>,
    pub duration_ms: Option<u64>,
}

impl From<CurrentlyPlaying> for TrackSummary {
    fn from(playing: CurrentlyPlaying) -> Self {
        let item = playing.item.as_ref();
        Self {
            is_playing: playing.is_playing,
            track_name: item.map(|t| t.name.clone()),
            artist_name: item.and_then(|t| t.main_artist()).map(str::to_string),
            album_name: item.map(|t| t.album.name.clone()),
            progress_ms: playing.progress_ms,
            duration_ms: item.map(|t| t.duration_ms),
        }
    }
}

/// Current track probe result: details, or a plain message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CurrentTrackProbe {
    Playing(TrackSummary),
    Nothing(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTrack {
    pub track_name: String,
    pub artist_name: Option<String>,
    pub played_at: String,
}

impl From<PlayHistory> for RecentTrack {
    fn from(entry: PlayHistory) -> Self {
        Self {
            artist_name: entry.track.main_artist().map(str::to_string),
            track_name: entry.track.name,
            played_at: entry
                .played_at
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Report of a run where the client could talk to the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub api_connection: &'static str,
    pub current_user: Option<UserSummary>,
    pub current_track: Option<CurrentTrackProbe>,
    pub recent_tracks: Option<Vec<RecentTrack>>,
    pub errors: Vec<String>,
}

/// Outcome of `/test-spotify`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Diagnostics {
    Connected(DiagnosticsReport),
    Failed {
        api_connection: &'static str,
        error: String,
        message: &'static str,
    },
}

impl Diagnostics {
    /// Report for a client that could not be set up
    pub fn connection_failed(error: &SpotifyError) -> Self {
        Diagnostics::Failed {
            api_connection: "ERROR",
            error: error.to_string(),
            message: "Failed to connect to the Spotify API",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Diagnostics::Connected(_))
    }
}

/// Probes the Web API with `client`
pub async fn run_diagnostics(client: &SpotifyClient) -> Diagnostics {
    let mut report = DiagnosticsReport {
        api_connection: "OK",
        current_user: None,
        current_track: None,
        recent_tracks: None,
        errors: Vec::new(),
    };

    match client.current_user().await {
        Ok(user) => report.current_user = Some(user.into()),
        Err(e) => report.errors.push(format!("User info error: {}", e)),
    }

    match client.currently_playing().await {
        Ok(Some(playing)) => {
            report.current_track = Some(CurrentTrackProbe::Playing(playing.into()))
        }
        Ok(None) => {
            report.current_track = Some(CurrentTrackProbe::Nothing(NO_TRACK_PLAYING.to_string()))
        }
        Err(e) => report.errors.push(format!("Current track error: {}", e)),
    }

    match client.recently_played(RECENT_TRACKS_LIMIT).await {
        Ok(items) => {
            report.recent_tracks = Some(items.into_iter().map(RecentTrack::from).collect())
        }
        Err(e) => report.errors.push(format!("Recent tracks error: {}", e)),
    }

    if report.errors.is_empty() {
        debug!("Spotify diagnostics passed");
    } else {
        warn!(errors = report.errors.len(), "Spotify diagnostics reported errors");
    }

    Diagnostics::Connected(report)
}
