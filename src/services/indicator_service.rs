//! RSI and MACD built on the recursive EMA

use crate::models::{MacdSeries, Series};
use crate::services::series_math::ema;
use crate::utils::ChartError;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Added to the average loss so a loss-free window never divides by zero
pub const RSI_EPSILON: f64 = 1e-9;

/// Close-to-close change, undefined at the first sample
fn deltas(closes: &Series) -> Series {
    let mut prev: Option<f64> = None;
    closes.map_values(|value| {
        let delta = match (prev, value) {
            (Some(p), Some(v)) => Some(v - p),
            _ => None,
        };
        prev = value;
        delta
    })
}

/// Relative strength index.
///
/// Average gain and loss use the recursive EMA with span `period`, seeded at
/// the first defined delta. `rs = avg_gain / (avg_loss + RSI_EPSILON)`, so a
/// flat series reads 0 rather than an idealised 50.
pub fn rsi(closes: &Series, period: usize) -> Result<Series, ChartError> {
    let delta = deltas(closes);
    let gains = delta.map_values(|d| d.map(|d| d.max(0.0)));
    let losses = delta.map_values(|d| d.map(|d| (-d).max(0.0)));

    let avg_gain = ema(&gains, period)?;
    let avg_loss = ema(&losses, period)?;

    avg_gain.combine(&avg_loss, |gain, loss| {
        let rs = gain / (loss + RSI_EPSILON);
        100.0 - 100.0 / (1.0 + rs)
    })
}

/// MACD line (fast EMA minus slow EMA), its signal EMA and the histogram between them
pub fn macd(
    closes: &Series,
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdSeries, ChartError> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;

    let macd_line = fast_ema.combine(&slow_ema, |f, s| f - s)?;
    let signal_line = ema(&macd_line, signal)?;
    let histogram = macd_line.combine(&signal_line, |m, s| m - s)?;

    Ok(MacdSeries {
        macd_line,
        signal_line,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(i: usize) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap()
    }

    fn closes(values: impl IntoIterator<Item = f64>) -> Series {
        let values: Vec<f64> = values.into_iter().collect();
        Series::from_parts((0..values.len()).map(ts), values.into_iter().map(Some))
    }

    #[test]
    fn test_rsi_undefined_only_at_first_sample() {
        let out = rsi(&closes([100.0, 101.0, 100.5]), RSI_PERIOD).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.get(0), None);
        assert!(out.get(1).is_some());
        assert!(out.get(2).is_some());
    }

    #[test]
    fn test_rsi_flat_series_is_epsilon_biased_zero() {
        let out = rsi(&closes(std::iter::repeat(100.0).take(60)), RSI_PERIOD).unwrap();

        assert_eq!(out.len(), 60);
        assert_eq!(out.get(0), None);
        for i in 1..60 {
            assert_eq!(out.get(i), Some(0.0));
        }
    }

    #[test]
    fn test_rsi_rising_series_approaches_100() {
        let out = rsi(&closes((100..160).map(f64::from)), RSI_PERIOD).unwrap();

        for i in 1..60 {
            let v = out.get(i).unwrap();
            assert!(v > 99.9999 && v <= 100.0, "rsi[{}] = {}", i, v);
        }
    }

    #[test]
    fn test_rsi_falling_series_approaches_0() {
        let out = rsi(&closes((100..160).rev().map(f64::from)), RSI_PERIOD).unwrap();
        for i in 1..60 {
            assert_eq!(out.get(i), Some(0.0));
        }
    }

    #[test]
    fn test_rsi_stays_in_range_on_mixed_moves() {
        let prices = (0..120).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.05);
        let out = rsi(&closes(prices), RSI_PERIOD).unwrap();

        for (_, v) in out.defined() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_rsi_matches_hand_computed_value() {
        // deltas: +2, -1 ; span 14 => alpha = 2/15
        let out = rsi(&closes([10.0, 12.0, 11.0]), RSI_PERIOD).unwrap();
        let alpha = 2.0 / 15.0;
        let gain = (1.0 - alpha) * 2.0;
        let loss = alpha * 1.0;
        let rs = gain / (loss + RSI_EPSILON);
        let expected = 100.0 - 100.0 / (1.0 + rs);

        assert!((out.get(2).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_macd_is_full_length() {
        let out = macd(&closes([5.0, 6.0]), MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();

        assert_eq!(out.macd_line.len(), 2);
        assert_eq!(out.signal_line.len(), 2);
        assert_eq!(out.histogram.len(), 2);
        assert_eq!(out.macd_line.get(0), Some(0.0));
        assert!(out.histogram.values().all(|v| v.is_some()));
    }

    #[test]
    fn test_macd_histogram_is_line_minus_signal() {
        let prices = (0..80).map(|i| 50.0 + (i as f64 / 3.0).cos() * 2.0);
        let out = macd(&closes(prices), MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();

        for i in 0..80 {
            let m = out.macd_line.get(i).unwrap();
            let s = out.signal_line.get(i).unwrap();
            assert_eq!(out.histogram.get(i).unwrap(), m - s);
        }
    }

    #[test]
    fn test_macd_rising_series_turns_positive_then_flattens() {
        let out = macd(&closes((100..160).map(f64::from)), MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap();
        let line: Vec<f64> = out.macd_line.values().map(|v| v.unwrap()).collect();

        for i in 1..line.len() {
            assert!(line[i] > 0.0);
            assert!(line[i] > line[i - 1]);
        }
        let early_step = line[2] - line[1];
        let late_step = line[59] - line[58];
        assert!(late_step < early_step / 10.0);
        // lag difference of the two EMAs on a unit slope: (26 - 12) / 2
        assert!((line[59] - 7.0).abs() < 0.5);
    }

    #[test]
    fn test_invalid_period_propagates() {
        assert!(matches!(
            rsi(&closes([1.0, 2.0]), 0),
            Err(ChartError::InvalidParameter(_))
        ));
        assert!(matches!(
            macd(&closes([1.0, 2.0]), 12, 0, 9),
            Err(ChartError::InvalidParameter(_))
        ));
    }
}
