//! Candle sources

use std::future::Future;

use crate::models::Candle;

pub mod binance;

pub use binance::{ApiError, BinanceClient};

/// Anything that can supply a candle series for `(symbol, interval, limit)`.
///
/// Candles come back oldest first.
pub trait CandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> impl Future<Output = Result<Vec<Candle>, ApiError>> + Send;
}
