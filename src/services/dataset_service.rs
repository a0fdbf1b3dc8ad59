//! Builds the indicator dataset behind a signal chart

use tracing::debug;

use crate::models::{Candle, Series, SignalDataset};
use crate::services::heikin_ashi::to_heikin_ashi;
use crate::services::indicator_service::{macd, rsi, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD};
use crate::services::series_math::{ema, sma};
use crate::utils::ChartError;

/// Fewest candles accepted for a chart request
pub const MIN_CANDLES: usize = 50;
/// Candles shown on the chart
pub const DISPLAY_WINDOW: usize = 50;
pub const SMA_WINDOW: usize = 20;
pub const EMA_WINDOW: usize = 200;

/// Compute Heikin-Ashi candles, SMA20, EMA200, RSI14 and MACD(12,26,9) over the
/// whole input, then keep only the last `DISPLAY_WINDOW` samples of each.
///
/// Long windows are seeded by the history before the displayed range, so the
/// trim has to come after the computation.
pub fn build_signal_dataset(candles: &[Candle]) -> Result<SignalDataset, ChartError> {
    if candles.len() < MIN_CANDLES {
        return Err(ChartError::insufficient(MIN_CANDLES, candles.len()));
    }

    let closes = Series::closes(candles);

    let ha_candles = to_heikin_ashi(candles)?;
    let sma20 = sma(&closes, SMA_WINDOW)?;
    let ema200 = ema(&closes, EMA_WINDOW)?;
    let rsi14 = rsi(&closes, RSI_PERIOD)?;
    let macd_series = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?;

    let start = ha_candles.len() - DISPLAY_WINDOW.min(ha_candles.len());
    debug!(
        "Computed indicators over {} candles, keeping the last {}",
        candles.len(),
        ha_candles.len() - start
    );

    Ok(SignalDataset {
        ha_candles: ha_candles[start..].to_vec(),
        sma20: sma20.tail(DISPLAY_WINDOW),
        ema200: ema200.tail(DISPLAY_WINDOW),
        rsi14: rsi14.tail(DISPLAY_WINDOW),
        macd: macd_series.tail(DISPLAY_WINDOW),
    })
}
