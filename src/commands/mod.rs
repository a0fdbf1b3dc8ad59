pub mod chart;

pub const USAGE: &str = "Usage: signal-chart SYMBOL [INTERVAL]\n  e.g. signal-chart BTCUSDT 15m  (default interval: 5m)";

pub const DEFAULT_INTERVAL: &str = "5m";

/// A parsed chart invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub interval: String,
}

/// Parse positional arguments (program name already stripped).
///
/// Returns `None` when the symbol is missing or extra arguments are given.
pub fn parse_args(args: &[String]) -> Option<ChartRequest> {
    let (symbol, interval) = match args {
        [symbol] => (symbol, DEFAULT_INTERVAL),
        [symbol, interval] => (symbol, interval.as_str()),
        _ => return None,
    };

    let symbol = symbol.trim();
    if symbol.is_empty() {
        return None;
    }

    Some(ChartRequest {
        symbol: symbol.to_uppercase(),
        interval: interval.trim().to_string(),
    })
}
