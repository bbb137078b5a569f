//! Route handlers
//!
//! Each weather/geocode handler validates its query, derives the cache key
//! and upstream locator, then defers to the cached fetch proxy.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};

use super::error::ApiError;
use super::protocol::{CacheReport, CoordinateQuery, HealthResponse, QueryPairs, SearchQuery};
use crate::proxy::CachedFetchProxy;
use crate::upstream::ResourceLocator;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<CachedFetchProxy>,
}

async fn proxied(
    state: &AppState,
    key: String,
    locator: ResourceLocator,
    fallback: &'static str,
) -> Result<Response, ApiError> {
    let payload = state
        .proxy
        .get(&key, &locator)
        .await
        .map_err(|e| ApiError::upstream(e, fallback))?;

    Ok(Json(payload.as_ref()).into_response())
}

pub async fn current_weather_handler(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = CoordinateQuery::from_pairs(pairs);
    let (lat, lon) = query.require()?;
    let locator = state.proxy.client().current_weather(lat, lon);

    proxied(
        &state,
        format!("current_{}_{}", lat, lon),
        locator,
        "Failed to fetch current weather",
    )
    .await
}

pub async fn forecast_handler(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = CoordinateQuery::from_pairs(pairs);
    let (lat, lon) = query.require()?;
    let locator = state.proxy.client().forecast(lat, lon);

    proxied(
        &state,
        format!("forecast_{}_{}", lat, lon),
        locator,
        "Failed to fetch forecast",
    )
    .await
}

pub async fn air_quality_handler(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = CoordinateQuery::from_pairs(pairs);
    let (lat, lon) = query.require()?;
    let locator = state.proxy.client().air_quality(lat, lon);

    proxied(
        &state,
        format!("air_quality_{}_{}", lat, lon),
        locator,
        "Failed to fetch air quality data",
    )
    .await
}

pub async fn geocode_search_handler(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = SearchQuery::from_pairs(pairs);
    let q = query.require()?;
    let locator = state.proxy.client().geocode_search(q);

    proxied(
        &state,
        format!("geocode_{}", q),
        locator,
        "Failed to search location",
    )
    .await
}

pub async fn reverse_geocode_handler(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let query = CoordinateQuery::from_pairs(pairs);
    let (lat, lon) = query.require()?;
    let locator = state.proxy.client().reverse_geocode(lat, lon);

    proxied(
        &state,
        format!("reverse_{}_{}", lat, lon),
        locator,
        "Failed to reverse geocode",
    )
    .await
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.proxy.cache();
    cache.log_metrics();

    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        cache: CacheReport {
            keys: cache.key_count(),
            stats: cache.stats(),
        },
    })
}
