//! Extension pour intégrer la configuration Spotify dans pmoconfig
//!
//! Ce module fournit le trait `SpotifyConfigExt` qui ajoute à
//! `pmoconfig::Config` les réglages `sources.spotify.*`.
//!
//! Les valeurs sensibles (client secret, access token) sont chiffrées avec
//! la clé machine de pmoconfig ; les valeurs en clair restent acceptées en
//! lecture.

use crate::client::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::Value;

/// URI de redirection OAuth par défaut (frontend local)
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";

const SPOTIFY: [&str; 2] = ["sources", "spotify"];

fn key(name: &str) -> [&str; 3] {
    [SPOTIFY[0], SPOTIFY[1], name]
}

/// Trait d'extension pour gérer la configuration Spotify dans pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmospotify::SpotifyConfigExt;
///
/// let config = get_config();
/// config.set_spotify_access_token("BQD...")?;
/// let token = config.get_spotify_access_token()?;
/// ```
pub trait SpotifyConfigExt {
    /// Client ID de l'application Spotify
    fn get_spotify_client_id(&self) -> Result<Option<String>>;

    fn set_spotify_client_id(&self, client_id: &str) -> Result<()>;

    /// Client secret (déchiffré)
    fn get_spotify_client_secret(&self) -> Result<Option<String>>;

    /// Stocke le client secret chiffré
    fn set_spotify_client_secret(&self, secret: &str) -> Result<()>;

    /// URI de redirection OAuth
    fn get_spotify_redirect_uri(&self) -> Result<String>;

    fn set_spotify_redirect_uri(&self, uri: &str) -> Result<()>;

    /// Access token courant (déchiffré), `None` si absent
    fn get_spotify_access_token(&self) -> Result<Option<String>>;

    /// Stocke l'access token chiffré
    fn set_spotify_access_token(&self, token: &str) -> Result<()>;

    /// URL de base de la Web API (modifiable pour les tests)
    fn get_spotify_api_base_url(&self) -> Result<String>;

    fn set_spotify_api_base_url(&self, url: &str) -> Result<()>;

    /// Timeout des requêtes HTTP en secondes (défaut : 30)
    fn get_spotify_request_timeout_secs(&self) -> Result<u64>;

    fn set_spotify_request_timeout_secs(&self, secs: u64) -> Result<()>;
}

fn get_string(config: &Config, name: &str) -> Option<String> {
    match config.get_value(&key(name)) {
        Ok(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

impl SpotifyConfigExt for Config {
    fn get_spotify_client_id(&self) -> Result<Option<String>> {
        Ok(get_string(self, "client_id"))
    }

    fn set_spotify_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(&key("client_id"), Value::String(client_id.to_string()))
    }

    fn get_spotify_client_secret(&self) -> Result<Option<String>> {
        self.get_secret(&key("client_secret"))
    }

    fn set_spotify_client_secret(&self, secret: &str) -> Result<()> {
        self.set_secret(&key("client_secret"), secret)
    }

    fn get_spotify_redirect_uri(&self) -> Result<String> {
        Ok(get_string(self, "redirect_uri").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()))
    }

    fn set_spotify_redirect_uri(&self, uri: &str) -> Result<()> {
        self.set_value(&key("redirect_uri"), Value::String(uri.to_string()))
    }

    fn get_spotify_access_token(&self) -> Result<Option<String>> {
        self.get_secret(&key("access_token"))
    }

    fn set_spotify_access_token(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(anyhow!("Access token cannot be empty"));
        }
        self.set_secret(&key("access_token"), token)
    }

    fn get_spotify_api_base_url(&self) -> Result<String> {
        Ok(get_string(self, "api_base_url").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()))
    }

    fn set_spotify_api_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&key("api_base_url"), Value::String(url.to_string()))
    }

    fn get_spotify_request_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&key("request_timeout_secs")) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(secs) if secs > 0 => Ok(secs),
                _ => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
            },
            _ => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    fn set_spotify_request_timeout_secs(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(anyhow!("Request timeout must be at least one second"));
        }
        self.set_value(&key("request_timeout_secs"), Value::Number(secs.into()))
    }
}
