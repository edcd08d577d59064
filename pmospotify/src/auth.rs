//! Access token supply
//!
//! The OAuth authorization-code flow happens outside this process (the web
//! frontend or the Spotify developer console). The client only needs a
//! bearer token, obtained through a [`TokenProvider`] on every request.

use crate::error::{Result, SpotifyError};
use async_trait::async_trait;

/// Source of bearer tokens for the Web API
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, mostly for tests and one-shot tools
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(SpotifyError::MissingToken);
        }
        Ok(self.token.clone())
    }
}

#[cfg(feature = "pmoconfig")]
pub use config_provider::ConfigTokenProvider;

#[cfg(feature = "pmoconfig")]
mod config_provider {
    use super::TokenProvider;
    use crate::config_ext::SpotifyConfigExt;
    use crate::error::{Result, SpotifyError};
    use async_trait::async_trait;
    use pmoconfig::Config;
    use std::sync::Arc;

    /// Reads `sources.spotify.access_token` on every request
    ///
    /// A token replaced in the configuration is picked up without restart.
    pub struct ConfigTokenProvider {
        config: Arc<Config>,
    }

    impl ConfigTokenProvider {
        pub fn new(config: Arc<Config>) -> Self {
            Self { config }
        }
    }

    #[async_trait]
    impl TokenProvider for ConfigTokenProvider {
        async fn access_token(&self) -> Result<String> {
            self.config
                .get_spotify_access_token()?
                .ok_or(SpotifyError::MissingToken)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        assert_eq!(
            StaticTokenProvider::new("BQD123").access_token().await.unwrap(),
            "BQD123"
        );
        assert!(matches!(
            StaticTokenProvider::new("").access_token().await,
            Err(SpotifyError::MissingToken)
        ));
    }
}
