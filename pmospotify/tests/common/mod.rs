#![allow(dead_code)]

use pmospotify::{SpotifyClient, StaticTokenProvider};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "BQD-test-token";

pub fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::builder()
        .base_url(format!("{}/v1", server.uri()))
        .token_provider(Arc::new(StaticTokenProvider::new(TOKEN)))
        .build()
        .unwrap()
}

pub fn track_json(name: &str, artist_id: Option<&str>, artist: &str) -> Value {
    json!({
        "id": "track-1",
        "name": name,
        "artists": [{"id": artist_id, "name": artist, "type": "artist"}],
        "album": {
            "id": "album-1",
            "name": "Kind of Blue",
            "images": [
                {"url": "https://i.scdn.co/image/album-640", "height": 640, "width": 640},
                {"url": "https://i.scdn.co/image/album-64", "height": 64, "width": 64}
            ]
        },
        "duration_ms": 545000,
        "external_urls": {"spotify": "https://open.spotify.com/track/track-1"},
        "is_local": false
    })
}

pub fn currently_playing_json(is_playing: bool, item: Option<Value>) -> Value {
    json!({
        "timestamp": 1714566896000u64,
        "is_playing": is_playing,
        "progress_ms": 42000,
        "item": item,
        "currently_playing_type": "track"
    })
}

pub fn artist_json(id: &str, name: &str, images: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "images": images.iter().map(|url| json!({"url": url, "height": 320, "width": 320})).collect::<Vec<_>>(),
        "genres": ["jazz", "cool jazz"],
        "followers": {"total": 1200000},
        "popularity": 70
    })
}

pub fn user_json() -> Value {
    json!({
        "id": "listener",
        "display_name": "Listener",
        "email": "listener@example.org",
        "country": "FR",
        "product": "premium"
    })
}

pub fn recently_played_json(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "track": track_json(&format!("Track {}", i), Some("miles"), "Miles Davis"),
                "played_at": format!("2024-05-01T12:0{}:00.000Z", i)
            })
        })
        .collect();
    json!({"items": items, "limit": count, "next": null})
}
