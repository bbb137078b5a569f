//! Daemon configuration loaded from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::cache::store::{DEFAULT_TTL, MAX_TTL};
use crate::upstream::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Clone)]
pub struct Config {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// OpenWeather API key, empty when not configured
    pub api_key: String,
    /// OpenWeather API host
    pub base_url: String,
    /// How long upstream responses stay cached
    pub cache_ttl: Duration,
    /// Dashboard assets served for non-API paths
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {:?}", value))?,
            None => DEFAULT_PORT,
        };

        let cache_ttl = match lookup("CACHE_TTL_SECS") {
            Some(value) => {
                let ttl = value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .with_context(|| format!("Invalid CACHE_TTL_SECS value: {:?}", value))?;
                ensure!(
                    ttl <= MAX_TTL,
                    "Invalid CACHE_TTL_SECS value: {:?} exceeds the {} second maximum",
                    value,
                    MAX_TTL.as_secs()
                );
                ttl
            }
            None => DEFAULT_TTL,
        };

        Ok(Self {
            port,
            api_key: lookup("OPENWEATHER_API_KEY")
                .map(|key| key.trim().to_string())
                .unwrap_or_default(),
            base_url: lookup("OPENWEATHER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_ttl,
            static_dir: PathBuf::from(
                lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
