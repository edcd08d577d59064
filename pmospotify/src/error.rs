//! Error types for the Spotify client

use pmolive::SourceError;

/// Result type alias for Spotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Errors that can occur when talking to the Spotify Web API
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    /// Token missing, expired or lacking a scope (401/403)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Unknown resource (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Too many requests (429)
    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Any other non-success status
    #[error("Spotify API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// No access token configured
    #[error("No Spotify access token configured")]
    MissingToken,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl SpotifyError {
    /// Classifies a non-success HTTP status
    pub fn from_status_code(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimited { retry_after: None },
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }

    /// Sets the `Retry-After` delay of a rate-limit error
    pub fn with_retry_after(self, secs: Option<u64>) -> Self {
        match self {
            Self::RateLimited { .. } => Self::RateLimited { retry_after: secs },
            other => other,
        }
    }

    /// Credential problem: the token must be replaced
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::MissingToken)
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<SpotifyError> for SourceError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::Unauthorized(_) | SpotifyError::MissingToken => {
                SourceError::Unauthorized(e.to_string())
            }
            SpotifyError::RateLimited { retry_after } => SourceError::RateLimited { retry_after },
            SpotifyError::Http(e) => SourceError::Http(e.to_string()),
            SpotifyError::Json(e) => SourceError::Malformed(e.to_string()),
            other => SourceError::Upstream(other.to_string()),
        }
    }
}
