//! Cached Remote Fetch Proxy
//!
//! Serves a payload from the response cache when fresh, otherwise fetches
//! it from the upstream API and stores it for the cache TTL.
//!
//! Concurrent misses for the same key are not coalesced: each one issues
//! its own upstream request and the last successful write wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::cache::ResponseCache;
use crate::upstream::{OpenWeatherClient, ResourceLocator, UpstreamError};

pub struct CachedFetchProxy {
    cache: Arc<ResponseCache>,
    client: OpenWeatherClient,
}

impl CachedFetchProxy {
    pub fn new(cache: Arc<ResponseCache>, client: OpenWeatherClient) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn client(&self) -> &OpenWeatherClient {
        &self.client
    }

    /// Return the cached payload for `key`, or fetch `locator` and cache it
    ///
    /// `key` is used verbatim. A failed fetch is returned to the caller and
    /// leaves the cache untouched.
    pub async fn get(
        &self,
        key: &str,
        locator: &ResourceLocator,
    ) -> Result<Arc<Value>, UpstreamError> {
        if let Some(payload) = self.cache.get(key) {
            return Ok(payload);
        }

        match self.client.fetch(locator).await {
            Ok(payload) => Ok(self.cache.insert(key.to_string(), payload)),
            Err(e) => {
                error!(key = key, error = %e, "Upstream fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_support::MockUpstream;

    fn proxy_with_ttl(upstream: &MockUpstream, ttl: Duration) -> CachedFetchProxy {
        let client = OpenWeatherClient::new(&upstream.base_url, "test-key").unwrap();
        CachedFetchProxy::new(Arc::new(ResponseCache::with_ttl(ttl)), client)
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_upstream() {
        let upstream = MockUpstream::start().await;
        let proxy = proxy_with_ttl(&upstream, Duration::from_secs(300));
        let locator = proxy.client().current_weather("40.71", "-74.00");

        let first = proxy.get("current_40.71_-74.00", &locator).await.unwrap();
        let second = proxy.get("current_40.71_-74.00", &locator).await.unwrap();

        assert_eq!(upstream.calls(), 1);
        assert_eq!(
            serde_json::to_vec(&*first).unwrap(),
            serde_json::to_vec(&*second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_refetch_after_ttl() {
        let upstream = MockUpstream::start().await;
        let proxy = proxy_with_ttl(&upstream, Duration::from_millis(200));
        let locator = proxy.client().current_weather("40.71", "-74.00");

        let first = proxy.get("current_40.71_-74.00", &locator).await.unwrap();
        assert_eq!(first["call"], 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        proxy.get("current_40.71_-74.00", &locator).await.unwrap();
        assert_eq!(upstream.calls(), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let refreshed = proxy.get("current_40.71_-74.00", &locator).await.unwrap();
        assert_eq!(upstream.calls(), 2);
        assert_eq!(refreshed["call"], 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let upstream = MockUpstream::start().await;
        let proxy = proxy_with_ttl(&upstream, Duration::from_secs(300));
        let locator = proxy.client().forecast("1", "2");

        upstream.set_failing(true);
        let err = proxy.get("forecast_1_2", &locator).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(proxy.cache().key_count(), 0);

        // Next request goes upstream again and succeeds
        upstream.set_failing(false);
        proxy.get("forecast_1_2", &locator).await.unwrap();
        assert_eq!(upstream.calls(), 2);
        assert_eq!(proxy.cache().key_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_other_entries() {
        let upstream = MockUpstream::start().await;
        let proxy = proxy_with_ttl(&upstream, Duration::from_secs(300));
        let paris = proxy.client().geocode_search("Paris");
        let oslo = proxy.client().geocode_search("Oslo");

        let cached = proxy.get("geocode_Paris", &paris).await.unwrap();

        upstream.set_failing(true);
        assert!(proxy.get("geocode_Oslo", &oslo).await.is_err());

        // Still served from cache while upstream is failing
        let again = proxy.get("geocode_Paris", &paris).await.unwrap();
        assert_eq!(cached, again);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let upstream = MockUpstream::start().await;
        let proxy = proxy_with_ttl(&upstream, Duration::from_secs(300));

        let current = proxy.client().current_weather("1", "2");
        let air = proxy.client().air_quality("1", "2");

        let a = proxy.get("current_1_2", &current).await.unwrap();
        let b = proxy.get("air_quality_1_2", &air).await.unwrap();

        assert_eq!(a["path"], "/data/2.5/weather");
        assert_eq!(b["path"], "/data/2.5/air_pollution");
        assert_eq!(upstream.calls(), 2);

        let stats = proxy.cache().stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }
}
