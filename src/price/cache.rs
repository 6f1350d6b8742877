use std::time::{Duration, Instant};

pub const DEFAULT_PRICE_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedPrice {
    pub price: f64,
    pub stored_at: Instant,
}

impl CachedPrice {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }
}

/// Single-entry price cache with a fixed time-to-live.
///
/// Every operation takes the current instant so callers decide the clock.
#[derive(Debug)]
pub struct PriceCache {
    ttl: Duration,
    entry: Option<CachedPrice>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set(&mut self, price: f64, now: Instant) {
        self.entry = Some(CachedPrice {
            price,
            stored_at: now,
        });
    }

    /// The stored price, if it is still fresh at `now`.
    pub fn get(&self, now: Instant) -> Option<CachedPrice> {
        if self.is_expired(now) {
            return None;
        }
        self.entry
    }

    /// True when nothing is stored or the stored price is at least `ttl` old.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.entry {
            Some(entry) => entry.age(now) >= self.ttl,
            None => true,
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_CACHE_TTL)
    }
}
