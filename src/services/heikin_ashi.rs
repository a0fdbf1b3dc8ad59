//! Heikin-Ashi candle transform
//!
//! Each output open depends on the previous output candle, so the transform is
//! a strict left-to-right scan over the input.

use crate::models::{Candle, HeikinAshiCandle};
use crate::utils::ChartError;

/// Convert raw candles into Heikin-Ashi candles on the same index.
///
/// * close = (open + high + low + close) / 4
/// * open  = (prev HA open + prev HA close) / 2, or (open + close) / 2 for the first candle
/// * high  = max(HA open, HA close, raw high)
/// * low   = min(HA open, HA close, raw low)
pub fn to_heikin_ashi(candles: &[Candle]) -> Result<Vec<HeikinAshiCandle>, ChartError> {
    if candles.is_empty() {
        return Err(ChartError::insufficient(1, 0));
    }

    let ha = candles
        .iter()
        .scan(None, |prev: &mut Option<(f64, f64)>, c| {
            let close = (c.open + c.high + c.low + c.close) / 4.0;
            let open = match *prev {
                Some((prev_open, prev_close)) => (prev_open + prev_close) / 2.0,
                None => (c.open + c.close) / 2.0,
            };
            *prev = Some((open, close));

            Some(HeikinAshiCandle {
                timestamp: c.timestamp,
                open,
                high: c.high.max(open).max(close),
                low: c.low.min(open).min(close),
                close,
                volume: c.volume,
            })
        })
        .collect();

    Ok(ha)
}
