//! HTTP client for the Spotify Web API
//!
//! # Example
//!
//! ```no_run
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::with_token("BQD...")?;
//!
//!     match client.currently_playing().await? {
//!         Some(playing) => println!("{:?}", playing.item.map(|t| t.name)),
//!         None => println!("Nothing playing"),
//!     }
//!     Ok(())
//! }
//! ```

use crate::auth::{StaticTokenProvider, TokenProvider};
use crate::error::{Result, SpotifyError};
use crate::models::{
    Artist, CurrentlyPlaying, ErrorEnvelope, PlayHistory, PlayerState, RecentlyPlayedPage, User,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Web API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PMONowPlaying/0.1.0 (pmospotify)";

/// Spotify Web API client
///
/// Stateless apart from the token provider: every call asks it for a
/// bearer token. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client with a fixed access token and default settings
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        Self::builder()
            .token_provider(Arc::new(StaticTokenProvider::new(token)))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.tokens
    }

    // ========================================================================
    // Player
    // ========================================================================

    /// Track currently playing, `None` when the player is inactive (204)
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        self.get_optional("/me/player/currently-playing", &[]).await
    }

    /// Full player state (device, shuffle, repeat...), `None` when inactive
    pub async fn playback_state(&self) -> Result<Option<PlayerState>> {
        self.get_optional("/me/player", &[]).await
    }

    /// Last played tracks, most recent first (`limit` is clamped to 1..=50)
    pub async fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistory>> {
        let limit = limit.clamp(1, 50).to_string();
        let page: RecentlyPlayedPage = self
            .get("/me/player/recently-played", &[("limit", limit.as_str())])
            .await?;
        Ok(page.items)
    }

    // ========================================================================
    // Catalog / profile
    // ========================================================================

    pub async fn artist(&self, artist_id: &str) -> Result<Artist> {
        self.get(&format!("/artists/{}", artist_id), &[]).await
    }

    /// Profile of the token owner
    pub async fn current_user(&self) -> Result<User> {
        self.get("/me", &[]).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.get_optional(path, query).await?.ok_or_else(|| {
            SpotifyError::Api {
                status: StatusCode::NO_CONTENT.as_u16(),
                message: format!("Empty response for {}", path),
            }
        })
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.tokens.access_token().await?;

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            warn!("Spotify API error ({}): {}", status.as_u16(), message);
            return Err(
                SpotifyError::from_status_code(status.as_u16(), message)
                    .with_retry_after(retry_after),
            );
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}

/// Builder for [`SpotifyClient`]
pub struct ClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
    tokens: Option<Arc<dyn TokenProvider>>,
    client: Option<Client>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tokens: None,
            client: None,
        }
    }
}

impl ClientBuilder {
    /// Set a custom base URL (for testing)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Use an existing reqwest client (timeout and user agent are then ignored)
    pub fn http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SpotifyClient> {
        let tokens = self.tokens.ok_or(SpotifyError::MissingToken)?;
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(self.user_agent)
                .build()?,
        };

        Ok(SpotifyClient {
            client,
            base_url: self.base_url,
            tokens,
        })
    }
}

#[cfg(feature = "pmoconfig")]
impl SpotifyClient {
    /// Client configured from `sources.spotify.*`
    ///
    /// The token is read from the configuration on every request.
    pub fn from_config(config: Arc<pmoconfig::Config>) -> Result<Self> {
        use crate::auth::ConfigTokenProvider;
        use crate::config_ext::SpotifyConfigExt;

        Self::builder()
            .base_url(config.get_spotify_api_base_url()?)
            .timeout(Duration::from_secs(config.get_spotify_request_timeout_secs()?))
            .token_provider(Arc::new(ConfigTokenProvider::new(config)))
            .build()
    }
}
