//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::api::BinanceClient;
use crate::utils::ChartError;

#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub binance_base_url: String,
    pub output_dir: PathBuf,
    /// Candles requested per chart, before trimming to the display window
    pub fetch_limit: u16,
    /// Timezone used for axis labels and file names
    pub timezone: FixedOffset,
    pub timezone_label: String,
    pub http_timeout: Duration,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            binance_base_url: BinanceClient::DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("/tmp/charts"),
            fetch_limit: 100,
            timezone: kst(),
            timezone_label: "KST".to_string(),
            http_timeout: Duration::from_secs(10),
            width: 1320,
            height: 880,
        }
    }
}

const KST_OFFSET_SECS: i32 = 9 * 3600;

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ChartError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ChartError::Config(format!("{}='{}': {}", key, raw, e)))
}

impl ChartConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ChartError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a key lookup, falling back to defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChartError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BINANCE_BASE_URL") {
            config.binance_base_url = url;
        }
        if let Some(dir) = lookup("CHART_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("CHART_FETCH_LIMIT") {
            let limit: u16 = parse_var("CHART_FETCH_LIMIT", &raw)?;
            if limit == 0 || limit > BinanceClient::MAX_LIMIT {
                return Err(ChartError::Config(format!(
                    "CHART_FETCH_LIMIT must be between 1 and {}, got {}",
                    BinanceClient::MAX_LIMIT,
                    limit
                )));
            }
            config.fetch_limit = limit;
        }
        if let Some(raw) = lookup("CHART_UTC_OFFSET_HOURS") {
            let hours: i32 = parse_var("CHART_UTC_OFFSET_HOURS", &raw)?;
            config.timezone = hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    ChartError::Config(format!("CHART_UTC_OFFSET_HOURS out of range: {}", hours))
                })?;
        }
        if let Some(label) = lookup("CHART_TZ_LABEL") {
            config.timezone_label = label;
        }
        if let Some(raw) = lookup("CHART_HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_var("CHART_HTTP_TIMEOUT_SECS", &raw)?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("CHART_WIDTH") {
            config.width = parse_var("CHART_WIDTH", &raw)?;
        }
        if let Some(raw) = lookup("CHART_HEIGHT") {
            config.height = parse_var("CHART_HEIGHT", &raw)?;
        }

        if config.width == 0 || config.height == 0 {
            return Err(ChartError::Config("chart size must be non-zero".to_string()));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ChartConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.binance_base_url, "https://api.binance.com");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/charts"));
        assert_eq!(config.fetch_limit, 100);
        assert_eq!(config.timezone.local_minus_utc(), 9 * 3600);
        assert_eq!(config.timezone_label, "KST");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = ChartConfig::from_lookup(lookup(&[
            ("CHART_FETCH_LIMIT", "500"),
            ("CHART_UTC_OFFSET_HOURS", "-5"),
            ("CHART_TZ_LABEL", "EST"),
            ("CHART_OUTPUT_DIR", "./out"),
        ]))
        .unwrap();

        assert_eq!(config.fetch_limit, 500);
        assert_eq!(config.timezone.local_minus_utc(), -5 * 3600);
        assert_eq!(config.timezone_label, "EST");
        assert_eq!(config.output_dir, PathBuf::from("./out"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ChartConfig::from_lookup(lookup(&[("CHART_FETCH_LIMIT", "0")])),
            Err(ChartError::Config(_))
        ));
        assert!(matches!(
            ChartConfig::from_lookup(lookup(&[("CHART_FETCH_LIMIT", "abc")])),
            Err(ChartError::Config(_))
        ));
        assert!(matches!(
            ChartConfig::from_lookup(lookup(&[("CHART_UTC_OFFSET_HOURS", "30")])),
            Err(ChartError::Config(_))
        ));
        assert!(matches!(
            ChartConfig::from_lookup(lookup(&[("CHART_WIDTH", "0")])),
            Err(ChartError::Config(_))
        ));
    }
}
