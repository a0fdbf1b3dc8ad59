//! Heikin-Ashi signal charts.
//!
//! Fetches OHLCV candles, derives Heikin-Ashi candles, SMA20, EMA200, RSI14 and
//! MACD(12,26,9), and renders them into a single annotated PNG.

pub mod api;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::ChartConfig;
pub use models::{Candle, HeikinAshiCandle, MacdSeries, Series, SignalDataset};
pub use services::dataset_service::build_signal_dataset;
pub use services::signal_service::generate_signal_chart;
pub use utils::ChartError;
