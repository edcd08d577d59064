//! Spotify as a now-playing source

use crate::client::SpotifyClient;
use crate::models::{Artist, CurrentlyPlaying, Track};
use async_trait::async_trait;
use pmolive::{
    AlbumRef, ArtistProfile, ArtistRef, NowPlayingSource, PlaybackState, SourceError, TrackItem,
};

impl From<Track> for TrackItem {
    fn from(track: Track) -> Self {
        TrackItem {
            name: track.name,
            artists: track
                .artists
                .into_iter()
                .map(|a| ArtistRef {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            album: AlbumRef {
                name: track.album.name,
                images: track.album.images.into_iter().map(|i| i.url).collect(),
            },
            duration_ms: track.duration_ms,
            external_url: track.external_urls.spotify.unwrap_or_default(),
        }
    }
}

impl From<CurrentlyPlaying> for PlaybackState {
    fn from(playing: CurrentlyPlaying) -> Self {
        PlaybackState {
            is_playing: playing.is_playing,
            progress_ms: playing.progress_ms,
            item: playing.item.map(TrackItem::from),
        }
    }
}

impl From<Artist> for ArtistProfile {
    fn from(artist: Artist) -> Self {
        ArtistProfile {
            name: artist.name,
            images: artist.images.into_iter().map(|i| i.url).collect(),
        }
    }
}

#[async_trait]
impl NowPlayingSource for SpotifyClient {
    async fn currently_playing(&self) -> Result<Option<PlaybackState>, SourceError> {
        Ok(SpotifyClient::currently_playing(self)
            .await?
            .map(PlaybackState::from))
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile, SourceError> {
        Ok(SpotifyClient::artist(self, artist_id).await?.into())
    }
}
