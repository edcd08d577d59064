mod common;

use common::{artist_json, client_for, currently_playing_json, track_json};
use pmolive::{
    FETCH_FAILED, NOTHING_PLAYING, NowPlayingSnapshot, NowPlayingSource, SnapshotCapture,
    TRACK_UNAVAILABLE,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn capture_from(server: &MockServer) -> NowPlayingSnapshot {
    let source: Arc<dyn NowPlayingSource> = Arc::new(client_for(server));
    SnapshotCapture::new(source).capture().await
}

#[tokio::test]
async fn test_playing_track_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(currently_playing_json(
            true,
            Some(track_json("So What", Some("miles"), "Miles Davis")),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/miles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(artist_json(
            "miles",
            "Miles Davis",
            &["https://i.scdn.co/image/miles-640", "https://i.scdn.co/image/miles-64"],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = capture_from(&server).await;
    let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(value["is_playing"], true);
    let track = &value["track"];
    assert_eq!(track["name"], "So What");
    assert_eq!(track["artists"], serde_json::json!(["Miles Davis"]));
    assert_eq!(track["album"], "Kind of Blue");
    assert_eq!(track["album_art"], "https://i.scdn.co/image/album-640");
    assert_eq!(
        track["artist_images"],
        serde_json::json!([{"name": "Miles Davis", "image": "https://i.scdn.co/image/miles-640"}])
    );
    assert_eq!(track["duration_ms"], 545000);
    assert_eq!(track["progress_ms"], 42000);
    assert_eq!(
        track["external_url"],
        "https://open.spotify.com/track/track-1"
    );
}

#[tokio::test]
async fn test_local_artist_is_not_looked_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(currently_playing_json(
            true,
            Some(track_json("Demo", None, "Me")),
        )))
        .mount(&server)
        .await;

    let snapshot = capture_from(&server).await;
    let track = snapshot.track().expect("playing");
    assert!(track.artist_images.is_empty());
    assert_eq!(track.artists, vec!["Me"]);
}

#[tokio::test]
async fn test_idle_snapshots() {
    let inactive = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&inactive)
        .await;
    assert_eq!(
        capture_from(&inactive).await,
        NowPlayingSnapshot::idle(NOTHING_PLAYING)
    );

    let paused = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(currently_playing_json(
            false,
            Some(track_json("So What", Some("miles"), "Miles Davis")),
        )))
        .mount(&paused)
        .await;
    assert_eq!(
        capture_from(&paused).await,
        NowPlayingSnapshot::idle(NOTHING_PLAYING)
    );

    let advert = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(currently_playing_json(true, None)))
        .mount(&advert)
        .await;
    assert_eq!(
        capture_from(&advert).await,
        NowPlayingSnapshot::idle(TRACK_UNAVAILABLE)
    );
}

#[tokio::test]
async fn test_expired_token_degrades_to_error_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"status": 401, "message": "The access token expired"}
        })))
        .mount(&server)
        .await;

    let snapshot = capture_from(&server).await;
    let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(value["is_playing"], false);
    assert_eq!(value["message"], FETCH_FAILED);
    assert!(
        value["error"]
            .as_str()
            .unwrap()
            .contains("The access token expired")
    );
}
