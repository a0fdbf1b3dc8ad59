use thiserror::Error;

use crate::api::binance::ApiError;

/// Errors raised while building or rendering a signal chart
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Insufficient data: need at least {required} candles, got {got}")]
    InsufficientData { required: usize, got: usize },
    #[error("Candle fetch failed: {0}")]
    Fetch(#[from] ApiError),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChartError {
    pub(crate) fn insufficient(required: usize, got: usize) -> Self {
        ChartError::InsufficientData { required, got }
    }
}
