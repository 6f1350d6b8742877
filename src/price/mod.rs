mod cache;
mod cached;
mod error;
mod poller;
mod source;

pub use cache::{CachedPrice, DEFAULT_PRICE_CACHE_TTL, PriceCache};
pub use cached::{CachedPriceSource, PriceQuote};
pub use error::PriceError;
pub use poller::{DEFAULT_PRICE_POLL_INTERVAL, PricePoller};
pub use source::{
    COINGECKO_PRICE_URL, CoinGeckoSource, DEFAULT_PRICE_REQUEST_TIMEOUT, PriceSource,
};
