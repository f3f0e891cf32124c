mod config;
mod file_store;

use aksjefolio_core::market_data::SnapshotAssembler;
use aksjefolio_core::{AnalysisService, AnalyticsConfig};
use anyhow::Context;
use config::Config;
use file_store::PortfolioFile;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: aksjefolio <portfolio.json> [portfolio-id]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config.log_format);

    let mut args = std::env::args().skip(1);
    let path = args.next().context(USAGE)?;
    let portfolio_id = args.next().unwrap_or_else(|| "main".to_string());

    let analytics = match &config.analytics_config {
        Some(path) => AnalyticsConfig::from_file(path)?,
        None => AnalyticsConfig::default(),
    };

    let (store, feed) = PortfolioFile::load(&path)?.into_parts();
    let assembler = SnapshotAssembler::new(Arc::new(feed), &analytics.market_data);
    let service = AnalysisService::new(analytics);

    tracing::info!("Analyzing portfolio '{}' from {}", portfolio_id, path);
    let result = service
        .analyze_portfolio(
            &store,
            &assembler,
            &portfolio_id,
            config.benchmark.as_deref(),
            config.timeframe_days,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        anyhow::bail!(
            "analysis failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays valid JSON.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
