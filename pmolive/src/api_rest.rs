//! HTTP handlers of the live feed
//!
//! - `GET /current-track`: one snapshot, computed on demand
//! - `GET /ws`: WebSocket push feed

use crate::pmoserver_ext::LiveState;
use crate::snapshot::NowPlayingSnapshot;
use crate::ws::WebSocketTransport;
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use tracing::{debug, warn};

/// GET /current-track
pub async fn current_track(State(state): State<LiveState>) -> Json<NowPlayingSnapshot> {
    Json(state.feed.snapshot().await)
}

/// GET /ws
pub async fn live_socket(ws: WebSocketUpgrade, State(state): State<LiveState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: LiveState) {
    let disconnect = state.shutdown.child_token();
    let (transport, reader) = WebSocketTransport::split(socket, disconnect.clone());

    match state.feed.serve(transport.clone(), disconnect.clone()).await {
        Ok(outcome) => debug!(
            subscriber = %outcome.subscriber,
            reason = ?outcome.reason,
            deliveries = outcome.deliveries,
            "WebSocket session finished"
        ),
        Err(e) => warn!("WebSocket session rejected: {}", e),
    }

    disconnect.cancel();
    transport.close().await;
    reader.abort();
}

pub fn create_router(state: LiveState) -> Router {
    Router::new()
        .route("/current-track", get(current_track))
        .route("/ws", get(live_socket))
        .with_state(state)
}
