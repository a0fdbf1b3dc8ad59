use std::path::PathBuf;

use tracing::info;

use super::ChartRequest;
use crate::api::BinanceClient;
use crate::config::ChartConfig;
use crate::services::signal_service;
use crate::utils::ChartError;

pub async fn execute(request: &ChartRequest, config: &ChartConfig) -> Result<PathBuf, ChartError> {
    info!("💹 Chart command called for {} {}", request.symbol, request.interval);

    let client = BinanceClient::with_base_url(config.binance_base_url.clone(), config.http_timeout)?;
    let path =
        signal_service::generate_signal_chart(&client, &request.symbol, &request.interval, config)
            .await?;

    info!("Chart saved to {}", path.display());
    Ok(path)
}
