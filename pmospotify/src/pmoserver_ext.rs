//! Extension pmoserver pour la source Spotify
//!
//! Ce module fournit un trait d'extension qui crée le client Spotify depuis
//! la configuration et monte l'endpoint de diagnostic.

use crate::client::SpotifyClient;
use anyhow::Result;
use pmolive::NowPlayingSource;
use std::sync::Arc;

/// État partagé pour les handlers Spotify
#[derive(Clone)]
pub struct SpotifyState {
    pub client: Arc<SpotifyClient>,
}

impl SpotifyState {
    pub fn new(client: Arc<SpotifyClient>) -> Self {
        Self { client }
    }

    /// Le client vu comme source "now playing" pour pmolive
    pub fn source(&self) -> Arc<dyn NowPlayingSource> {
        self.client.clone()
    }
}

/// Trait pour étendre pmoserver avec la source Spotify
///
/// # Exemple
///
/// ```rust,ignore
/// use pmolive::LiveFeedExt;
/// use pmospotify::SpotifyExt;
/// use pmoserver::ServerBuilder;
///
/// let mut server = ServerBuilder::new_configured().build();
/// let spotify = server.init_spotify().await?;
/// server.init_live_feed(spotify.source()).await?;
/// ```
pub trait SpotifyExt {
    /// Crée le client depuis `sources.spotify.*` et monte les routes
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /test-spotify` - Diagnostic de connexion à la Web API
    ///
    /// L'absence de token n'empêche pas le démarrage : elle est signalée
    /// par `/test-spotify` et dans les snapshots.
    async fn init_spotify(&mut self) -> Result<Arc<SpotifyState>>;

    /// Comme `init_spotify()` avec un client déjà construit
    async fn init_spotify_with_client(
        &mut self,
        client: SpotifyClient,
    ) -> Result<Arc<SpotifyState>>;
}
