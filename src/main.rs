use mav_aggregator::{
    Aggregator, AggregatorConfig, InfluxClient, InfluxSampleRepository, RunOutcome,
    SampleRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mav_aggregator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AggregatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("🚀 Moving-average aggregation job starting");
    tracing::info!("   Source bucket: {}", config.source_bucket);
    tracing::info!("   Target bucket: {}", config.bucket);
    tracing::info!(
        "   Lookback: {} days, window: {} samples",
        config.lookback_days,
        config.window
    );

    let client = match InfluxClient::new(&config.url, &config.token, &config.org) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Failed to create InfluxDB client: {}", e);
            std::process::exit(1);
        }
    };

    let repository =
        Arc::new(InfluxSampleRepository::new(client, &config)) as Arc<dyn SampleRepository>;
    let aggregator = Aggregator::new(repository, config.window);

    // The external scheduler invoking this job sees failures via the exit code
    match aggregator.run().await {
        Ok(RunOutcome::NoData) => {
            tracing::info!("✅ Run finished without data; nothing written");
        }
        Ok(RunOutcome::Completed(summary)) => {
            tracing::info!(
                "✅ Run finished: {} moving averages written, {} tickers skipped",
                summary.written.len(),
                summary.skipped.len()
            );
        }
        Err(e) => {
            tracing::error!("❌ Aggregation run failed: {}", e);
            std::process::exit(1);
        }
    }
}
