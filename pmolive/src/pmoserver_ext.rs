//! Extension pmoserver pour le flux live
//!
//! Ce module fournit un trait d'extension pour monter le flux "now playing"
//! (WebSocket + endpoint à la demande) sur un serveur pmoserver.

use crate::feed::{LiveFeed, LiveOptions};
use crate::source::NowPlayingSource;
use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// État partagé pour les handlers du flux live
#[derive(Clone)]
pub struct LiveState {
    pub feed: Arc<LiveFeed>,
    /// Annulé à l'arrêt du serveur ; chaque session en dérive son jeton
    pub shutdown: CancellationToken,
}

impl LiveState {
    pub fn new(feed: Arc<LiveFeed>, shutdown: CancellationToken) -> Self {
        Self { feed, shutdown }
    }
}

/// Trait pour étendre pmoserver avec le flux live
///
/// `pmolive` ajoute ses routes à `pmoserver::Server` sans que pmoserver
/// dépende de pmolive. La source (Spotify, ...) est fournie par l'appelant.
///
/// # Exemple
///
/// ```rust,ignore
/// use pmolive::LiveFeedExt;
/// use pmoserver::ServerBuilder;
///
/// let mut server = ServerBuilder::new_configured().build();
/// server.init_live_feed(source).await?;
/// server.start().await?;
/// server.wait().await;
/// ```
pub trait LiveFeedExt {
    /// Monte le flux live avec les réglages `live.*` de la configuration
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /current-track` - Snapshot calculé à la demande
    /// - `GET /ws` - Flux WebSocket, un message JSON par poll
    async fn init_live_feed(
        &mut self,
        source: Arc<dyn NowPlayingSource>,
    ) -> Result<Arc<LiveState>>;

    /// Comme `init_live_feed()` avec des options explicites
    async fn init_live_feed_with_options(
        &mut self,
        source: Arc<dyn NowPlayingSource>,
        options: LiveOptions,
    ) -> Result<Arc<LiveState>>;
}
