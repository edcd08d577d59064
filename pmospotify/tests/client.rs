mod common;

use common::{TOKEN, artist_json, client_for, currently_playing_json, track_json, user_json};
use pmospotify::SpotifyError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_currently_playing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(currently_playing_json(
            true,
            Some(track_json("So What", Some("miles"), "Miles Davis")),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let playing = client_for(&server)
        .currently_playing()
        .await
        .unwrap()
        .expect("playing");

    assert!(playing.is_playing);
    assert_eq!(playing.progress_ms, Some(42000));
    let track = playing.item.unwrap();
    assert_eq!(track.name, "So What");
    assert_eq!(track.main_artist(), Some("Miles Davis"));
    assert_eq!(track.album.images.len(), 2);
}

#[tokio::test]
async fn test_inactive_player_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.currently_playing().await.unwrap().is_none());
    assert!(client.playback_state().await.unwrap().is_none());
}

#[tokio::test]
async fn test_artist_and_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/miles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(artist_json(
            "miles",
            "Miles Davis",
            &["https://i.scdn.co/image/miles"],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let artist = client.artist("miles").await.unwrap();
    assert_eq!(artist.name, "Miles Davis");
    assert_eq!(artist.genres, vec!["jazz", "cool jazz"]);
    assert_eq!(artist.images[0].url, "https://i.scdn.co/image/miles");

    let user = client.current_user().await.unwrap();
    assert_eq!(user.id, "listener");
    assert_eq!(user.country.as_deref(), Some("FR"));
}

#[tokio::test]
async fn test_recently_played_clamps_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/recently-played"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::recently_played_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let history = client_for(&server).recently_played(500).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].track.name, "Track 0");
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"status": 401, "message": "The access token expired"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/unknown"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    match client.current_user().await {
        Err(SpotifyError::Unauthorized(message)) => {
            assert_eq!(message, "The access token expired")
        }
        other => panic!("unexpected result {:?}", other),
    }

    assert!(matches!(
        client.currently_playing().await,
        Err(SpotifyError::RateLimited {
            retry_after: Some(3)
        })
    ));

    match client.artist("unknown").await {
        Err(SpotifyError::NotFound(message)) => assert_eq!(message, "not json"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"display_name\": 3"))
        .mount(&server)
        .await;

    assert!(matches!(
        client_for(&server).current_user().await,
        Err(SpotifyError::Json(_))
    ));
}
