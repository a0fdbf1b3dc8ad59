use std::process::ExitCode;

use signal_chart::commands::{self, chart};
use signal_chart::ChartConfig;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // stdout carries only the output path
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("signal_chart=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(request) = commands::parse_args(&args) else {
        eprintln!("{}", commands::USAGE);
        return ExitCode::FAILURE;
    };
    debug!("Parsed request: {:?}", request);

    let config = match ChartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match chart::execute(&request, &config).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ Error generating chart for {}: {}", request.symbol, e);
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}
