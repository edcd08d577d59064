//! HTTP handlers of the Spotify source
//!
//! - `GET /test-spotify`: connectivity diagnostics

use crate::diagnostics::{Diagnostics, run_diagnostics};
use crate::pmoserver_ext::SpotifyState;
use axum::{Json, Router, extract::State, routing::get};
use tracing::warn;

/// GET /test-spotify
///
/// Always answers 200: failures are described in the body.
pub async fn test_spotify(State(state): State<SpotifyState>) -> Json<Diagnostics> {
    if let Err(e) = state.client.token_provider().access_token().await {
        warn!("Spotify diagnostics aborted: {}", e);
        return Json(Diagnostics::connection_failed(&e));
    }
    Json(run_diagnostics(&state.client).await)
}

pub fn create_router(state: SpotifyState) -> Router {
    Router::new()
        .route("/test-spotify", get(test_spotify))
        .with_state(state)
}
