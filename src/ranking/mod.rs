use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use crate::batch::{BatchPolicy, fetch_batch};
use crate::errors::FundingError;
use crate::models::{AssetSummary, FundingSeries, RankedAsset};
use crate::series::annualize;
use crate::upstream::FundingSource;
use ordered_float::OrderedFloat;

/// Cap on how many liquid assets get their history fetched per ranking.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 30;

/// A liquidity-filtered asset waiting for its history.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub open_interest_usd: f64,
}

/// Ranks liquid assets by their average annualized funding rate.
pub struct RankingEngine {
    source: Arc<dyn FundingSource>,
    candidate_limit: usize,
}

impl RankingEngine {
    pub fn new(source: Arc<dyn FundingSource>, candidate_limit: usize) -> Self {
        Self {
            source,
            candidate_limit,
        }
    }

    /// Top `top_n` assets with at least `min_oi_usd` open interest, by mean
    /// annualized funding over the last `history_days`. Individual coin
    /// failures only remove that coin from the ranking.
    pub async fn rank_top_performers(
        &self,
        assets: &[AssetSummary],
        min_oi_usd: f64,
        top_n: usize,
        history_days: u32,
    ) -> Result<Vec<RankedAsset>, FundingError> {
        validate(min_oi_usd, top_n, history_days)?;

        let candidates = select_candidates(assets, min_oi_usd, self.candidate_limit);
        if candidates.is_empty() {
            tracing::info!("no assets above {min_oi_usd} USD open interest");
            return Ok(Vec::new());
        }

        let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
        let histories =
            fetch_batch(self.source.as_ref(), &names, history_days, BatchPolicy::BestEffort).await?;

        let ranked = rank_candidates(&candidates, &histories, top_n);
        tracing::info!(
            "ranked {} of {} candidates over {history_days}d",
            ranked.len(),
            candidates.len()
        );
        Ok(ranked)
    }
}

fn validate(min_oi_usd: f64, top_n: usize, history_days: u32) -> Result<(), FundingError> {
    if !min_oi_usd.is_finite() || min_oi_usd < 0.0 {
        return Err(FundingError::Validation(format!(
            "min_oi_usd must be a non-negative number, got {min_oi_usd}"
        )));
    }
    if top_n == 0 {
        return Err(FundingError::Validation("top_n must be at least 1".to_string()));
    }
    if history_days == 0 {
        return Err(FundingError::Validation("history days must be at least 1".to_string()));
    }
    Ok(())
}

/// Assets with `oi_usd >= min_oi_usd`, largest first, capped at `limit`.
/// Equal open interest keeps input order.
pub fn select_candidates(assets: &[AssetSummary], min_oi_usd: f64, limit: usize) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = assets
        .iter()
        .map(|a| Candidate {
            name: a.name.clone(),
            open_interest_usd: a.open_interest_usd(),
        })
        .filter(|c| c.open_interest_usd >= min_oi_usd)
        .collect();

    candidates.sort_by_key(|c| Reverse(OrderedFloat(c.open_interest_usd)));
    candidates.truncate(limit);
    candidates
}

/// Averages each candidate's history, drops candidates without samples and
/// returns the best `top_n`. Equal rates keep candidate order.
pub fn rank_candidates(
    candidates: &[Candidate],
    histories: &HashMap<String, FundingSeries>,
    top_n: usize,
) -> Vec<RankedAsset> {
    let mut ranked: Vec<RankedAsset> = candidates
        .iter()
        .filter_map(|c| {
            let series = histories.get(&c.name).filter(|s| !s.is_empty())?;
            let total: f64 = series.samples.iter().map(|s| s.funding_rate).sum();
            let avg_rate = total / series.len() as f64;

            Some(RankedAsset {
                name: c.name.clone(),
                avg_annualized_rate: annualize(avg_rate),
                open_interest_usd: c.open_interest_usd,
            })
        })
        .collect();

    ranked.sort_by_key(|r| Reverse(OrderedFloat(r.avg_annualized_rate)));
    ranked.truncate(top_n);
    ranked
}
