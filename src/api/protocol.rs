//! Query parameters and response bodies of the HTTP API

use serde::Serialize;

use super::error::ApiError;
use crate::cache::CacheStats;

/// Raw `name=value` pairs of a query string, in request order
///
/// Extracted as a list rather than a struct so repeated parameters never
/// cause a rejection; the first occurrence wins.
pub type QueryPairs = Vec<(String, String)>;

fn first(pairs: &QueryPairs, name: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

/// `?lat=..&lon=..` as sent by the dashboard
///
/// Kept as raw text: the same text goes into the cache key and the upstream
/// request, so `-74.00` and `-74` are distinct keys. Values are not checked
/// here; the upstream API reports malformed coordinates itself.
#[derive(Debug, Default)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl CoordinateQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        Self {
            lat: first(&pairs, "lat"),
            lon: first(&pairs, "lon"),
        }
    }

    /// Both coordinates, present and non-empty
    pub fn require(&self) -> Result<(&str, &str), ApiError> {
        match (self.lat.as_deref(), self.lon.as_deref()) {
            (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => Ok((lat, lon)),
            _ => Err(ApiError::MissingCoordinates),
        }
    }
}

/// `?q=..` for place name search
#[derive(Debug, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        Self {
            q: first(&pairs, "q"),
        }
    }

    pub fn require(&self) -> Result<&str, ApiError> {
        match self.q.as_deref() {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(ApiError::MissingQuery),
        }
    }
}

/// Body of `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339 UTC time the report was generated
    pub timestamp: String,
    pub cache: CacheReport,
}

#[derive(Debug, Serialize)]
pub struct CacheReport {
    /// Live (unexpired) keys
    pub keys: u64,
    pub stats: CacheStats,
}
