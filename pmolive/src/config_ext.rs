//! Extension pour intégrer le flux live dans pmoconfig
//!
//! Ce module fournit le trait `LiveConfigExt` qui ajoute à
//! `pmoconfig::Config` la lecture des réglages `live.*`.
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmolive::LiveConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let options = config.get_live_options()?;
//! println!("Polling every {:?}", options.poll_interval);
//! # Ok(())
//! # }
//! ```

use crate::feed::{DEFAULT_POLL_INTERVAL, FeedMode, LiveOptions};
use crate::registry::DEFAULT_DELIVERY_TIMEOUT;
use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::Value;
use std::time::Duration;
use tracing::warn;

/// Trait d'extension pour la configuration du flux live
pub trait LiveConfigExt {
    /// Intervalle de polling en secondes (défaut : 5, minimum : 1)
    fn get_live_poll_interval_secs(&self) -> Result<u64>;

    fn set_live_poll_interval_secs(&self, secs: u64) -> Result<()>;

    /// Mode de diffusion (`per_session` par défaut)
    fn get_live_mode(&self) -> Result<FeedMode>;

    fn set_live_mode(&self, mode: FeedMode) -> Result<()>;

    /// Cache des images d'artistes entre deux polls (défaut : activé)
    fn get_live_cache_artist_images(&self) -> Result<bool>;

    fn set_live_cache_artist_images(&self, enabled: bool) -> Result<()>;

    /// Délai maximal d'un envoi avant éviction du client (défaut : 10)
    fn get_live_delivery_timeout_secs(&self) -> Result<u64>;

    fn set_live_delivery_timeout_secs(&self, secs: u64) -> Result<()>;

    /// Tous les réglages `live.*` réunis
    fn get_live_options(&self) -> Result<LiveOptions> {
        Ok(LiveOptions {
            poll_interval: Duration::from_secs(self.get_live_poll_interval_secs()?),
            mode: self.get_live_mode()?,
            cache_artist_images: self.get_live_cache_artist_images()?,
            delivery_timeout: Duration::from_secs(self.get_live_delivery_timeout_secs()?),
        })
    }
}

impl LiveConfigExt for Config {
    fn get_live_poll_interval_secs(&self) -> Result<u64> {
        match self.get_value(&["live", "poll_interval_secs"]) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(0) | None => {
                    warn!("live.poll_interval_secs must be a positive integer, using 1");
                    Ok(1)
                }
                Some(secs) => Ok(secs),
            },
            _ => Ok(DEFAULT_POLL_INTERVAL.as_secs()),
        }
    }

    fn set_live_poll_interval_secs(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(anyhow!("Poll interval must be at least one second"));
        }
        self.set_value(&["live", "poll_interval_secs"], Value::Number(secs.into()))
    }

    fn get_live_mode(&self) -> Result<FeedMode> {
        match self.get_value(&["live", "mode"]) {
            Ok(Value::String(s)) => s.parse().map_err(|e: String| anyhow!(e)),
            _ => Ok(FeedMode::default()),
        }
    }

    fn set_live_mode(&self, mode: FeedMode) -> Result<()> {
        self.set_value(&["live", "mode"], Value::String(mode.to_string()))
    }

    fn get_live_cache_artist_images(&self) -> Result<bool> {
        match self.get_value(&["live", "cache_artist_images"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(true),
        }
    }

    fn set_live_cache_artist_images(&self, enabled: bool) -> Result<()> {
        self.set_value(&["live", "cache_artist_images"], Value::Bool(enabled))
    }

    fn get_live_delivery_timeout_secs(&self) -> Result<u64> {
        let default = DEFAULT_DELIVERY_TIMEOUT.as_secs();
        match self.get_value(&["live", "delivery_timeout_secs"]) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(0) | None => {
                    warn!(
                        "live.delivery_timeout_secs must be a positive integer, using {}",
                        default
                    );
                    Ok(default)
                }
                Some(secs) => Ok(secs),
            },
            _ => Ok(default),
        }
    }

    fn set_live_delivery_timeout_secs(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(anyhow!("Delivery timeout must be at least one second"));
        }
        self.set_value(&["live", "delivery_timeout_secs"], Value::Number(secs.into()))
    }
}
