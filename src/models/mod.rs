//! Data models for the signal chart pipeline
//!
//! Raw and Heikin-Ashi candles, time-indexed numeric series, and the dataset
//! handed from the indicator pipeline to the chart renderer.

pub mod candle;
pub mod chart;
pub mod series;

pub use candle::{Candle, HeikinAshiCandle};
pub use chart::{MacdSeries, SignalDataset};
pub use series::{Series, SeriesPoint};
