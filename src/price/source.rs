use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::error::{PriceError, validate_price};

/// Spot price of one bitcoin in EUR.
pub const COINGECKO_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur";

/// Upper bound on one request to the price endpoint, connect to last byte.
pub const DEFAULT_PRICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can quote the current unit price of the growth asset.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self) -> Result<f64, PriceError>;
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Arc<T> {
    async fn fetch_price(&self) -> Result<f64, PriceError> {
        (**self).fetch_price().await
    }
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: Option<CoinPrice>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    eur: Option<f64>,
}

/// Reads the price from CoinGecko's `simple/price` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    client: reqwest::Client,
    url: String,
}

impl CoinGeckoSource {
    pub fn new(url: impl Into<String>) -> Result<Self, PriceError> {
        Self::with_timeout(url, DEFAULT_PRICE_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, PriceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch_price(&self) -> Result<f64, PriceError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(PriceError::Upstream(format!("HTTP {status}: {text}")));
        }
        parse_simple_price(&text)
    }
}

fn parse_simple_price(body: &str) -> Result<f64, PriceError> {
    let parsed = serde_json::from_str::<SimplePriceResponse>(body)
        .map_err(|e| PriceError::InvalidPrice(format!("unreadable response: {e}")))?;
    let price = parsed
        .bitcoin
        .and_then(|coin| coin.eur)
        .ok_or_else(|| PriceError::InvalidPrice("response has no bitcoin.eur field".to_string()))?;
    validate_price(price)
}
