//! # pmospotify - Spotify source for PMO Now Playing
//!
//! This crate wraps the few Spotify Web API endpoints the now-playing feed
//! relies on, and exposes the client as a [`pmolive::NowPlayingSource`].
//!
//! ## Features
//!
//! - **Player**: currently playing track, playback state, listening history
//! - **Catalog**: artist details (images, genres)
//! - **Diagnostics**: [`run_diagnostics`] probes the API step by step
//! - **Configuration** (`pmoconfig`, default): `sources.spotify.*` with
//!   encrypted secrets, token re-read on every request
//! - **Server** (`pmoserver`): `GET /test-spotify` through [`SpotifyExt`]
//!
//! ## Authentication
//!
//! The OAuth flow is not handled here. A bearer token obtained elsewhere is
//! supplied through a [`TokenProvider`]; a missing or rejected token turns
//! into [`SpotifyError::MissingToken`] or [`SpotifyError::Unauthorized`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::with_token("BQD...")?;
//!
//!     let user = client.current_user().await?;
//!     println!("Connected as {}", user.id);
//!
//!     for entry in client.recently_played(3).await? {
//!         println!("{} - {}", entry.played_at, entry.track.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod source;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "pmoserver")]
pub mod api_rest;
#[cfg(feature = "pmoserver")]
pub mod pmoserver_ext;
#[cfg(feature = "pmoserver")]
mod pmoserver_impl;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::{
    ClientBuilder, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    SpotifyClient,
};
pub use diagnostics::{Diagnostics, DiagnosticsReport, run_diagnostics};
pub use error::{Result, SpotifyError};
pub use models::{
    Artist, CurrentlyPlaying, Device, Image, PlayHistory, PlayerState, SimplifiedAlbum,
    SimplifiedArtist, Track, User,
};

#[cfg(feature = "pmoconfig")]
pub use auth::ConfigTokenProvider;
#[cfg(feature = "pmoconfig")]
pub use config_ext::SpotifyConfigExt;

#[cfg(feature = "pmoserver")]
pub use pmoserver_ext::{SpotifyExt, SpotifyState};
