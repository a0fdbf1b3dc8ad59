use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Candle;

/// Kline intervals accepted by `/api/v3/klines`
pub const KLINE_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// One row of the klines response:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume, trades, taker_buy_base, taker_buy_quote, ignore]`
#[derive(Debug, Clone, Deserialize)]
pub struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub u64,
    pub String,
    pub String,
    pub String,
);

impl RawKline {
    /// Parse the decimal string fields into a candle keyed by open time
    pub fn to_candle(&self) -> Result<Candle, ApiError> {
        let timestamp = Utc
            .timestamp_millis_opt(self.0)
            .single()
            .ok_or_else(|| {
                ApiError::DeserializationError(format!("Invalid kline open time: {}", self.0))
            })?;

        Ok(Candle {
            timestamp,
            open: parse_decimal("open", &self.1)?,
            high: parse_decimal("high", &self.2)?,
            low: parse_decimal("low", &self.3)?,
            close: parse_decimal("close", &self.4)?,
            volume: parse_decimal("volume", &self.5)?,
        })
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, ApiError> {
    let value: f64 = raw.parse().map_err(|e| {
        ApiError::DeserializationError(format!("Invalid {} value '{}': {}", field, raw, e))
    })?;
    if !value.is_finite() {
        return Err(ApiError::DeserializationError(format!(
            "Non-finite {} value '{}'",
            field, raw
        )));
    }
    Ok(value)
}

/// Error body returned by the exchange, e.g. `{"code":-1121,"msg":"Invalid symbol."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Errors from the klines endpoint
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 403 Forbidden (WAF rule)
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 429 Too Many Requests or 418 IP ban
    #[error("Rate Limited. Retry after {retry_after} s")]
    RateLimited { retry_after: u64 },
    /// 5xx
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

/// Upper-case a trading symbol and check it is plain ASCII alphanumeric
pub fn normalize_symbol(symbol: &str) -> Result<String, ApiError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidInput(format!(
            "Invalid symbol '{}'. Expected something like BTCUSDT",
            symbol
        )));
    }
    Ok(symbol)
}

pub fn validate_interval(interval: &str) -> Result<(), ApiError> {
    if KLINE_INTERVALS.contains(&interval) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Unknown interval '{}'. Supported: {}",
            interval,
            KLINE_INTERVALS.join(", ")
        )))
    }
}
