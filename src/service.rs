use std::collections::HashMap;
use std::sync::Arc;

use crate::batch::{BatchPolicy, fetch_batch};
use crate::errors::FundingError;
use crate::history::{DAY_MS, fetch_full_history, validate_days};
use crate::models::{AssetSummary, FundingSeries, RankedAsset, SeriesPoint, SummaryStats};
use crate::ranking::RankingEngine;
use crate::series::{annualized_points, moving_average, summary_stats};
use crate::upstream::FundingSource;
use serde::Serialize;

/// Display-ready view of one coin's history.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedSeries {
    pub coin: String,
    pub stats: SummaryStats,
    pub annualized: Vec<SeriesPoint>,
    pub smoothed: Vec<SeriesPoint>,
}

/// Everything callers can ask of the core, independent of transport.
pub struct FundingService {
    source: Arc<dyn FundingSource>,
    ranking: RankingEngine,
    max_days: u32,
}

impl FundingService {
    /// `max_days` caps every lookback so one request cannot fan out into
    /// an unbounded number of chunk fetches.
    pub fn new(source: Arc<dyn FundingSource>, candidate_limit: usize, max_days: u32) -> Self {
        Self {
            ranking: RankingEngine::new(Arc::clone(&source), candidate_limit),
            source,
            max_days,
        }
    }

    pub async fn get_assets(&self) -> Result<Vec<AssetSummary>, FundingError> {
        Ok(self.source.fetch_asset_metadata().await?)
    }

    /// Full history for `coin` over the last `days` days.
    pub async fn get_funding_history(&self, coin: &str, days: u32) -> Result<FundingSeries, FundingError> {
        validate_coin(coin)?;
        validate_days(days, self.max_days)?;

        let end_time = chrono::Utc::now().timestamp_millis();
        let start_time = end_time - i64::from(days) * DAY_MS;
        let series = fetch_full_history(self.source.as_ref(), coin, start_time, end_time).await?;

        tracing::info!("{coin}: {} samples over {days}d", series.len());
        Ok(series)
    }

    /// All-or-nothing batch: one failing coin fails the call.
    pub async fn get_funding_history_batch(
        &self,
        coins: &[String],
        days: u32,
    ) -> Result<HashMap<String, FundingSeries>, FundingError> {
        if let Some(blank) = coins.iter().find(|c| c.trim().is_empty()) {
            return Err(FundingError::Validation(format!("invalid coin name {blank:?}")));
        }
        validate_days(days, self.max_days)?;
        fetch_batch(self.source.as_ref(), coins, days, BatchPolicy::FailFast).await
    }

    pub async fn get_top_performers(
        &self,
        assets: &[AssetSummary],
        history_days: u32,
        min_oi_usd: f64,
        top_n: usize,
    ) -> Result<Vec<RankedAsset>, FundingError> {
        validate_days(history_days, self.max_days)?;
        self.ranking
            .rank_top_performers(assets, min_oi_usd, top_n, history_days)
            .await
    }

    /// History plus the annualized, smoothed and summarized views of it.
    pub async fn get_derived_series(
        &self,
        coin: &str,
        days: u32,
        window: usize,
    ) -> Result<DerivedSeries, FundingError> {
        if window == 0 {
            return Err(FundingError::Validation("window must be at least 1".to_string()));
        }

        let series = self.get_funding_history(coin, days).await?;
        let annualized = annualized_points(&series.samples);

        Ok(DerivedSeries {
            stats: summary_stats(&series.samples),
            smoothed: moving_average(&annualized, window),
            annualized,
            coin: series.coin,
        })
    }
}

/// Case-insensitive substring match on asset name; a blank term matches all.
pub fn filter_assets(assets: Vec<AssetSummary>, term: &str) -> Vec<AssetSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return assets;
    }
    assets
        .into_iter()
        .filter(|a| a.name.to_lowercase().contains(&term))
        .collect()
}

fn validate_coin(coin: &str) -> Result<(), FundingError> {
    if coin.trim().is_empty() {
        return Err(FundingError::Validation("coin must not be empty".to_string()));
    }
    Ok(())
}
