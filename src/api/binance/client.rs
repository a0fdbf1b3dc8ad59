use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{normalize_symbol, validate_interval, ApiError, ErrorResponse, RawKline};
use crate::api::CandleSource;
use crate::models::Candle;

/// Binance spot REST client for kline (candle) history
pub struct BinanceClient {
    http_client: HttpClient,
    base_url: String,
}

impl BinanceClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.binance.com";
    pub const MAX_LIMIT: u16 = 1000;

    /// Create a client against the public Binance API
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string(), timeout)
    }

    /// Create a client with a custom base URL (mirrors, testing)
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `Retry-After` is sent in seconds on 429 and 418
    fn extract_retry_after(response: &reqwest::Response) -> u64 {
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    /// Map a non-success response to an `ApiError`
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = Self::extract_retry_after(&response);
        let body_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .map(|e| e.msg)
            .unwrap_or(body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            403 => ApiError::Forbidden(message),
            418 | 429 => {
                warn!("Rate limited ({}), retry after {} s", status_code, retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET /api/v3/klines
    ///
    /// Fetches the most recent `limit` candles for `symbol` at `interval`, oldest first.
    ///
    /// # Arguments
    /// * `symbol` - Exchange symbol such as `BTCUSDT` (case-insensitive)
    /// * `interval` - One of `KLINE_INTERVALS`, e.g. `5m`
    /// * `limit` - Number of candles, 1..=1000
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>, ApiError> {
        let symbol = normalize_symbol(symbol)?;
        validate_interval(interval)?;
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                Self::MAX_LIMIT,
                limit
            )));
        }

        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();
        debug!("GET {} symbol={} interval={} limit={}", url, symbol, interval, limit);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let rows = response
            .json::<Vec<RawKline>>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?;

        rows.iter().map(RawKline::to_candle).collect()
    }
}

impl CandleSource for BinanceClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>, ApiError> {
        self.fetch_klines(symbol, interval, limit).await
    }
}
