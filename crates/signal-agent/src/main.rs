use std::sync::Arc;

use analysis_core::ResponseCache;
use analysis_orchestrator::AnalysisOrchestrator;
use anyhow::{bail, Result};
use chrono::Utc;
use market_data::{DiskCache, MarketDataClient, NoopCache};

mod config;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let tickers: Vec<String> = std::env::args().skip(1).collect();
    if tickers.is_empty() {
        bail!("usage: signal-agent TICKER [TICKER ...]");
    }

    let config = AgentConfig::from_env()?;
    let as_of = config.as_of.unwrap_or_else(|| Utc::now().date_naive());
    tracing::info!("Scoring {} ticker(s) as of {as_of}", tickers.len());

    let cache: Arc<dyn ResponseCache> = match &config.cache_dir {
        Some(dir) => {
            tracing::info!("Response cache at {dir}");
            Arc::new(DiskCache::new(dir)?)
        }
        None => Arc::new(NoopCache),
    };

    let client = MarketDataClient::new(
        config.alpha_vantage_key.clone(),
        config.finnhub_key.clone(),
    )
    .with_cache(cache);

    let orchestrator =
        AnalysisOrchestrator::new(Arc::new(client)).with_insider_limit(config.insider_limit);

    for ticker in &tickers {
        let analysis = match orchestrator.analyze(ticker, as_of).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!("{ticker}: analysis failed: {e}");
                continue;
            }
        };

        for message in analysis.messages() {
            println!("{}: {}", message.name, message.content);
            if config.show_reasoning {
                let payload: serde_json::Value = serde_json::from_str(&message.content)?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
    }

    Ok(())
}
