mod api;
mod batch;
mod config;
mod errors;
mod history;
mod models;
mod ranking;
mod series;
mod service;
mod upstream;

use std::sync::Arc;
use std::time::Duration;

use api::ApiServer;
use config::Config;
use service::FundingService;
use upstream::hyperliquid::Hyperliquid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "Fundlens starting — upstream {} on port {}",
        config.upstream_url,
        config.api_port
    );

    // ── 1. Upstream client ─────────────────────────────────────────
    let source = Hyperliquid::new(
        config.upstream_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    // ── 2. Core service ────────────────────────────────────────────
    let service = FundingService::new(Arc::new(source), config.rank_candidates, config.max_history_days);

    // ── 3. Serve until Ctrl+C ──────────────────────────────────────
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutting down...");
    };

    ApiServer::new(service, config).run(shutdown).await
}
