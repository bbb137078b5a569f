//! OpenWeather API Client
//!
//! Builds resource locators for the weather, air pollution and geocoding
//! endpoints and performs the actual GET on a cache miss.

use std::fmt;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::UpstreamError;

/// Public OpenWeather API host
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Maximum number of geocoding matches requested per search
const GEOCODE_SEARCH_LIMIT: u32 = 5;

/// A fully assembled upstream request target
///
/// Carries the credential so it can be dispatched as-is, but never prints
/// it: both `Display` and `Debug` omit the `appid` parameter.
#[derive(Clone)]
pub struct ResourceLocator {
    endpoint: String,
    params: Vec<(&'static str, String)>,
    api_key: String,
}

impl ResourceLocator {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            api_key: api_key.into(),
        }
    }

    /// Append a query parameter
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", separator, name, urlencoding::encode(value))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceLocator")
            .field(&self.to_string())
            .finish()
    }
}

/// OpenWeather API client
#[derive(Clone)]
pub struct OpenWeatherClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Scheme and host, without trailing slash
    base_url: String,
    /// OpenWeather API key sent as `appid`
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a client for the given API host
    ///
    /// No request timeout is set; a fetch runs until reqwest reports
    /// success or failure.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        if api_key.is_empty() {
            warn!("No OpenWeather API key configured, upstream calls will be rejected");
        }

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Whether an API key was supplied
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn locator(&self, path: &str) -> ResourceLocator {
        ResourceLocator::new(format!("{}{}", self.base_url, path), self.api_key.as_str())
    }

    /// Current conditions (metric units)
    pub fn current_weather(&self, lat: &str, lon: &str) -> ResourceLocator {
        self.locator("/data/2.5/weather")
            .param("lat", lat)
            .param("lon", lon)
            .param("units", "metric")
    }

    /// 5-day forecast in 3-hour steps (metric units)
    pub fn forecast(&self, lat: &str, lon: &str) -> ResourceLocator {
        self.locator("/data/2.5/forecast")
            .param("lat", lat)
            .param("lon", lon)
            .param("units", "metric")
    }

    /// Current pollutant levels
    pub fn air_quality(&self, lat: &str, lon: &str) -> ResourceLocator {
        self.locator("/data/2.5/air_pollution")
            .param("lat", lat)
            .param("lon", lon)
    }

    /// Place name to coordinates
    pub fn geocode_search(&self, query: &str) -> ResourceLocator {
        self.locator("/geo/1.0/direct")
            .param("q", query)
            .param("limit", GEOCODE_SEARCH_LIMIT.to_string())
    }

    /// Coordinates to place name
    pub fn reverse_geocode(&self, lat: &str, lon: &str) -> ResourceLocator {
        self.locator("/geo/1.0/reverse")
            .param("lat", lat)
            .param("lon", lon)
            .param("limit", "1")
    }

    /// GET the locator and decode the JSON body
    pub async fn fetch(&self, locator: &ResourceLocator) -> Result<Value, UpstreamError> {
        debug!(target_url = %locator, "Fetching from upstream");

        let response = self
            .http_client
            .get(&locator.endpoint)
            .query(&locator.params)
            .query(&[("appid", locator.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_status(status, &body));
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }
}
