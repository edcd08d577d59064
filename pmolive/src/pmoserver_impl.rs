//! Implémentation du trait LiveFeedExt pour pmoserver::Server

use crate::api_rest::create_router;
use crate::config_ext::LiveConfigExt;
use crate::feed::{LiveFeed, LiveOptions};
use crate::pmoserver_ext::{LiveFeedExt, LiveState};
use crate::source::NowPlayingSource;
use anyhow::Result;
use pmoserver::Server;
use std::sync::Arc;
use tracing::info;

impl LiveFeedExt for Server {
    async fn init_live_feed(
        &mut self,
        source: Arc<dyn NowPlayingSource>,
    ) -> Result<Arc<LiveState>> {
        let options = pmoconfig::get_config().get_live_options()?;
        self.init_live_feed_with_options(source, options).await
    }

    async fn init_live_feed_with_options(
        &mut self,
        source: Arc<dyn NowPlayingSource>,
        options: LiveOptions,
    ) -> Result<Arc<LiveState>> {
        info!(
            mode = %options.mode,
            interval = ?options.poll_interval,
            "Initializing live now-playing feed..."
        );

        let feed = Arc::new(LiveFeed::new(source, options));
        let shutdown = self.shutdown_token();
        if feed.start(shutdown.clone()).is_some() {
            info!("Shared poll loop started");
        }

        let state = LiveState::new(feed, shutdown);
        self.add_router("/", create_router(state.clone())).await;

        info!("Live feed available at /ws and /current-track");
        Ok(Arc::new(state))
    }
}
