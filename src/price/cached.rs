use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use super::cache::PriceCache;
use super::error::{PriceError, validate_price};
use super::source::{DEFAULT_PRICE_REQUEST_TIMEOUT, PriceSource};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price: f64,
    pub cached: bool,
    /// Seconds since the cached price was fetched; absent for fresh fetches.
    #[serde(rename = "cacheAge", skip_serializing_if = "Option::is_none")]
    pub cache_age_secs: Option<f64>,
}

/// Serves prices from a [`PriceCache`] and falls back to `source` once the
/// entry expires. Concurrent callers share a single in-flight fetch, which is
/// abandoned after `fetch_timeout` so the cache lock is never held longer.
pub struct CachedPriceSource<S> {
    source: S,
    cache: Mutex<PriceCache>,
    fetch_timeout: Duration,
}

impl<S: PriceSource> CachedPriceSource<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_cache(source, PriceCache::new(ttl))
    }

    pub fn with_cache(source: S, cache: PriceCache) -> Self {
        Self {
            source,
            cache: Mutex::new(cache),
            fetch_timeout: DEFAULT_PRICE_REQUEST_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub async fn ttl(&self) -> Duration {
        self.cache.lock().await.ttl()
    }

    pub async fn quote(&self) -> Result<PriceQuote, PriceError> {
        self.quote_at(Instant::now()).await
    }

    pub async fn quote_at(&self, now: Instant) -> Result<PriceQuote, PriceError> {
        let mut cache = self.cache.lock().await;
        if let Some(entry) = cache.get(now) {
            let age = entry.age(now);
            tracing::debug!(price = entry.price, age_secs = age.as_secs(), "price cache hit");
            return Ok(PriceQuote {
                price: entry.price,
                cached: true,
                cache_age_secs: Some(age.as_secs_f64()),
            });
        }

        tracing::debug!("price cache miss, fetching");
        let fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch_price())
            .await
            .map_err(|_| PriceError::Timeout(self.fetch_timeout))?;
        let price = validate_price(fetched?)?;
        cache.set(price, now);
        Ok(PriceQuote {
            price,
            cached: false,
            cache_age_secs: None,
        })
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for CachedPriceSource<S> {
    async fn fetch_price(&self) -> Result<f64, PriceError> {
        Ok(self.quote().await?.price)
    }
}
