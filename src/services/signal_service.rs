//! Chart request flow: fetch candles, build indicators, render

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::api::binance::models::{normalize_symbol, validate_interval};
use crate::api::CandleSource;
use crate::config::ChartConfig;
use crate::services::chart_service::render_signal_chart;
use crate::services::dataset_service::build_signal_dataset;
use crate::utils::ChartError;

/// Fetch candles for `symbol`, build the indicator dataset and render it.
///
/// Returns the path of the written PNG. Any failure aborts the request before
/// a file is produced.
pub async fn generate_signal_chart<S: CandleSource>(
    source: &S,
    symbol: &str,
    interval: &str,
    config: &ChartConfig,
) -> Result<PathBuf, ChartError> {
    let symbol = normalize_symbol(symbol)?;
    validate_interval(interval)?;
    info!("📈 Generating {} {} signal chart", symbol, interval);

    let candles = source
        .fetch_candles(&symbol, interval, config.fetch_limit)
        .await
        .map_err(|e| {
            warn!("Klines fetch error for {}: {}", symbol, e);
            ChartError::from(e)
        })?;
    debug!("Fetched {} candles for {}", candles.len(), symbol);

    let dataset = build_signal_dataset(&candles)?;

    // plotters and the PNG write block, keep them off the runtime workers
    let interval = interval.to_string();
    let config = config.clone();
    tokio::task::spawn_blocking(move || render_signal_chart(&dataset, &symbol, &interval, &config))
        .await
        .map_err(|e| ChartError::Render(format!("Render task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::Candle;
    use chrono::{TimeZone, Utc};

    struct StaticSource {
        candles: Result<Vec<Candle>, ApiError>,
    }

    impl CandleSource for StaticSource {
        async fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: &str,
            _limit: u16,
        ) -> Result<Vec<Candle>, ApiError> {
            self.candles.clone()
        }
    }

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let t = Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap();
                let close = 10.0 + (i as f64 / 4.0).sin();
                Candle::new(t, close - 0.2, close + 0.5, close - 0.5, close, 1.0)
            })
            .collect()
    }

    fn config() -> ChartConfig {
        ChartConfig {
            output_dir: std::env::temp_dir().join("signal_chart_tests_unused"),
            ..ChartConfig::default()
        }
    }

    #[tokio::test]
    async fn test_short_history_aborts_before_render() {
        let source = StaticSource { candles: Ok(candles(49)) };
        let config = config();

        let err = generate_signal_chart(&source, "btcusdt", "5m", &config)
            .await
            .unwrap_err();

        assert!(matches!(err, ChartError::InsufficientData { required: 50, got: 49 }));
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_fetch_is_insufficient_data() {
        let source = StaticSource { candles: Ok(Vec::new()) };
        let err = generate_signal_chart(&source, "BTCUSDT", "5m", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::InsufficientData { got: 0, .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let source = StaticSource {
            candles: Err(ApiError::ServerError(503, "maintenance".to_string())),
        };
        let err = generate_signal_chart(&source, "BTCUSDT", "5m", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::Fetch(ApiError::ServerError(503, _))));
    }

    #[tokio::test]
    async fn test_full_request_writes_chart() {
        let source = StaticSource { candles: Ok(candles(100)) };
        let config = ChartConfig {
            output_dir: std::env::temp_dir()
                .join(format!("signal_chart_request_{}", std::process::id())),
            ..ChartConfig::default()
        };

        let path = generate_signal_chart(&source, "ethusdt", "15m", &config)
            .await
            .unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("ETHUSDT_15m_"));
        assert!(name.ends_with(".png"));

        std::fs::remove_dir_all(&config.output_dir).ok();
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let source = StaticSource { candles: Ok(candles(60)) };
        let config = config();

        assert!(matches!(
            generate_signal_chart(&source, "BTC/USDT", "5m", &config).await,
            Err(ChartError::Fetch(ApiError::InvalidInput(_)))
        ));
        assert!(matches!(
            generate_signal_chart(&source, "BTCUSDT", "2m", &config).await,
            Err(ChartError::Fetch(ApiError::InvalidInput(_)))
        ));
    }
}
