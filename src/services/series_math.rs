//! Rolling and exponential aggregation over numeric series

use crate::models::Series;
use crate::utils::ChartError;

fn check_window(window: usize) -> Result<(), ChartError> {
    if window == 0 {
        return Err(ChartError::InvalidParameter(
            "window must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// EMA smoothing factor for a span of `window` samples
pub fn smoothing_factor(window: usize) -> f64 {
    2.0 / (window as f64 + 1.0)
}

/// Simple moving average.
///
/// Undefined at `i` unless all of the `window` samples ending at `i` are defined.
pub fn sma(series: &Series, window: usize) -> Result<Series, ChartError> {
    check_window(window)?;

    let values: Vec<Option<f64>> = series.values().collect();
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut defined = 0usize;

    for (i, value) in values.iter().enumerate() {
        if let Some(v) = value {
            sum += v;
            defined += 1;
        }
        if i >= window {
            if let Some(old) = values[i - window] {
                sum -= old;
                defined -= 1;
            }
        }
        out.push(if defined == window {
            Some(sum / window as f64)
        } else {
            None
        });
    }

    Ok(Series::from_parts(series.timestamps(), out))
}

/// Recursive exponential moving average (`adjust=false` form).
///
/// Seeded with the first defined sample, then
/// `ema[i] = alpha * v[i] + (1 - alpha) * ema[i - 1]`. Undefined samples after
/// the seed carry the previous average forward.
pub fn ema(series: &Series, window: usize) -> Result<Series, ChartError> {
    check_window(window)?;

    let alpha = smoothing_factor(window);
    let mut prev: Option<f64> = None;

    Ok(series.map_values(|value| {
        prev = match (prev, value) {
            (None, v) => v,
            (Some(p), Some(v)) => Some(alpha * v + (1.0 - alpha) * p),
            (Some(p), None) => Some(p),
        };
        prev
    }))
}
