#![cfg(feature = "pmoserver")]

mod common;

use anyhow::Result;
use common::ScriptedSource;
use futures::StreamExt;
use pmolive::api_rest::create_router;
use pmolive::{FeedMode, LiveFeed, LiveOptions, LiveState};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn websocket_client_receives_snapshots_until_it_closes() -> Result<()> {
    for mode in [FeedMode::PerSession, FeedMode::Shared] {
        let options = LiveOptions {
            mode,
            ..LiveOptions::default()
        };
        let feed = Arc::new(LiveFeed::new(
            ScriptedSource::playing("Song A", "Artist X", 1_000, 200_000),
            options,
        ));
        let shutdown = CancellationToken::new();
        let poll_loop = feed.start(shutdown.clone());

        // Real server on a free port
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let app = create_router(LiveState::new(feed.clone(), shutdown.clone()));
        let server = tokio::spawn(async move { axum::serve(listener, app).await });

        let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await?;
        let first = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await?
            .expect("socket open")?;
        let json: serde_json::Value = serde_json::from_str(first.to_text()?)?;
        assert_eq!(json["is_playing"], true, "{} mode", mode);
        assert_eq!(json["track"]["name"], "Song A");
        assert_eq!(json["track"]["artists"], serde_json::json!(["Artist X"]));
        assert_eq!(feed.registry().len().await, 1);

        ws.close(None).await?;
        tokio::time::timeout(Duration::from_secs(5), async {
            while !feed.registry().is_empty().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await?;

        shutdown.cancel();
        if let Some(poll_loop) = poll_loop {
            poll_loop.await?;
        }
        server.abort();
    }
    Ok(())
}
