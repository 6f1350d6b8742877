use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Price request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Price source returned an error: {0}")]
    Upstream(String),

    #[error("Price source returned an invalid price: {0}")]
    InvalidPrice(String),

    #[error("Price source did not answer within {0:?}")]
    Timeout(Duration),
}

pub(crate) fn validate_price(price: f64) -> Result<f64, PriceError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PriceError::InvalidPrice(price.to_string()));
    }
    Ok(price)
}
