//! Implémentation du trait SpotifyExt pour pmoserver::Server

use crate::api_rest::create_router;
use crate::client::SpotifyClient;
use crate::config_ext::SpotifyConfigExt;
use crate::pmoserver_ext::{SpotifyExt, SpotifyState};
use anyhow::Result;
use pmoserver::Server;
use std::sync::Arc;
use tracing::{info, warn};

impl SpotifyExt for Server {
    async fn init_spotify(&mut self) -> Result<Arc<SpotifyState>> {
        let config = pmoconfig::get_config();
        if config.get_spotify_access_token()?.is_none() {
            warn!("No Spotify access token configured (sources.spotify.access_token)");
        }

        let client = SpotifyClient::from_config(config)?;
        self.init_spotify_with_client(client).await
    }

    async fn init_spotify_with_client(
        &mut self,
        client: SpotifyClient,
    ) -> Result<Arc<SpotifyState>> {
        info!(base_url = client.base_url(), "Initializing Spotify source...");

        let state = SpotifyState::new(Arc::new(client));
        self.add_router("/", create_router(state.clone())).await;

        info!("Spotify diagnostics available at /test-spotify");
        Ok(Arc::new(state))
    }
}
