//! Time-indexed numeric series

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::candle::Candle;
use crate::utils::ChartError;

/// One sample of a numeric series. `value` is `None` while the series is still warming up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// An ordered numeric series aligned 1:1 with a candle series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    /// Pair timestamps with values. The shorter of the two inputs bounds the result.
    pub fn from_parts<T, V>(timestamps: T, values: V) -> Self
    where
        T: IntoIterator<Item = DateTime<Utc>>,
        V: IntoIterator<Item = Option<f64>>,
    {
        let points = timestamps
            .into_iter()
            .zip(values)
            .map(|(timestamp, value)| SeriesPoint { timestamp, value })
            .collect();
        Self { points }
    }

    /// Close prices of a candle series, all defined
    pub fn closes(candles: &[Candle]) -> Self {
        Self::from_parts(
            candles.iter().map(|c| c.timestamp),
            candles.iter().map(|c| Some(c.close)),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `index`, or `None` if undefined there or out of range
    pub fn get(&self, index: usize) -> Option<f64> {
        self.points.get(index).and_then(|p| p.value)
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|p| p.timestamp)
    }

    /// Defined samples only, as `(index, value)`
    pub fn defined(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.value.map(|v| (i, v)))
    }

    /// Same index, values rewritten by `f`
    pub fn map_values<F>(&self, mut f: F) -> Series
    where
        F: FnMut(Option<f64>) -> Option<f64>,
    {
        Series::new(
            self.points
                .iter()
                .map(|p| SeriesPoint {
                    timestamp: p.timestamp,
                    value: f(p.value),
                })
                .collect(),
        )
    }

    /// Pointwise combination of two aligned series. Undefined on either side stays undefined.
    ///
    /// Fails with `InvalidParameter` if the two series do not share a timestamp index.
    pub fn combine<F>(&self, other: &Series, f: F) -> Result<Series, ChartError>
    where
        F: Fn(f64, f64) -> f64,
    {
        if !self.timestamps().eq(other.timestamps()) {
            return Err(ChartError::InvalidParameter(format!(
                "cannot combine series with different indexes ({} vs {} samples)",
                self.len(),
                other.len()
            )));
        }

        Ok(Series::new(
            self.points
                .iter()
                .zip(other.points.iter())
                .map(|(a, b)| SeriesPoint {
                    timestamp: a.timestamp,
                    value: match (a.value, b.value) {
                        (Some(x), Some(y)) => Some(f(x, y)),
                        _ => None,
                    },
                })
                .collect(),
        ))
    }

    /// The most recent `n` samples (all of them if `n >= len`)
    pub fn tail(&self, n: usize) -> Series {
        let start = self.points.len().saturating_sub(n);
        Series::new(self.points[start..].to_vec())
    }
}
