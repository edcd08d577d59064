use pmolive::LiveFeedExt;
use pmoserver::ServerBuilder;
use pmospotify::SpotifyExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Serveur HTTP ==========

    let mut server = ServerBuilder::new_configured().build();
    server.init_logging().await;

    server
        .add_route("/", || async {
            serde_json::json!({"message": "Spotify Now Playing API"})
        })
        .await;

    // ========== PHASE 2 : Source et flux live ==========

    info!("🎵 Initializing Spotify source...");
    let spotify = server.init_spotify().await?;

    info!("📡 Initializing live feed...");
    let live = server.init_live_feed(spotify.source()).await?;
    if live.feed.options().poll_interval.as_secs() < 5 {
        warn!(
            "⚠️ Polling faster than every 5s may hit Spotify rate limits ({:?})",
            live.feed.options().poll_interval
        );
    }

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    server.start().await?;

    let info = server.info();
    info!("✅ PMONowPlaying is ready at http://{}:{}", info.base_url, info.http_port);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
