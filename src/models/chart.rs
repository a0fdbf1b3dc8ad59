//! Chart dataset models

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::candle::HeikinAshiCandle;
use super::series::Series;

/// MACD line, signal line and histogram on a shared index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd_line: Series,
    pub signal_line: Series,
    pub histogram: Series,
}

impl MacdSeries {
    pub fn tail(&self, n: usize) -> MacdSeries {
        MacdSeries {
            macd_line: self.macd_line.tail(n),
            signal_line: self.signal_line.tail(n),
            histogram: self.histogram.tail(n),
        }
    }
}

/// Everything the chart renderer needs for one symbol.
///
/// Every series shares the timestamp index of `ha_candles`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDataset {
    pub ha_candles: Vec<HeikinAshiCandle>,
    pub sma20: Series,
    pub ema200: Series,
    pub rsi14: Series,
    pub macd: MacdSeries,
}

impl SignalDataset {
    pub fn len(&self) -> usize {
        self.ha_candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ha_candles.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.ha_candles.iter().map(|c| c.timestamp)
    }
}
