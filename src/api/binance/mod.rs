pub mod client;
pub mod models;

pub use client::BinanceClient;
pub use models::{ApiError, RawKline, KLINE_INTERVALS};
