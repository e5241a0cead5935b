use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::FundingSource;
use crate::errors::UpstreamError;
use crate::models::{AssetSummary, FundingSample};
use async_trait::async_trait;

/// In-memory source for tests. Chunk requests return every stored sample with
/// `start <= time <= end`, so adjacent chunks overlap on their shared boundary
/// the same way the real endpoint does.
#[derive(Default)]
pub struct FakeSource {
    assets: Vec<AssetSummary>,
    history: HashMap<String, Vec<FundingSample>>,
    failing: HashSet<String>,
    fail_metadata: bool,
    calls: Mutex<Vec<(String, i64, i64)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(mut self, assets: Vec<AssetSummary>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_history(mut self, coin: &str, samples: Vec<FundingSample>) -> Self {
        self.history.insert(coin.to_string(), samples);
        self
    }

    pub fn failing_for(mut self, coin: &str) -> Self {
        self.failing.insert(coin.to_string());
        self
    }

    pub fn failing_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    /// Every chunk request seen so far, as `(coin, start, end)`.
    pub fn calls(&self) -> Vec<(String, i64, i64)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn sample(time: i64, funding_rate: f64) -> FundingSample {
    FundingSample {
        time,
        funding_rate,
        premium: 0.0,
    }
}

pub fn asset(name: &str, mark_price: f64, open_interest: f64) -> AssetSummary {
    AssetSummary {
        name: name.to_string(),
        current_funding: 0.0,
        mark_price,
        open_interest,
    }
}

#[async_trait]
impl FundingSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_asset_metadata(&self) -> Result<Vec<AssetSummary>, UpstreamError> {
        if self.fail_metadata {
            return Err(UpstreamError::UnexpectedData("metadata unavailable".to_string()));
        }
        Ok(self.assets.clone())
    }

    async fn fetch_funding_chunk(
        &self,
        coin: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<FundingSample>, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((coin.to_string(), start_time, end_time));

        if self.failing.contains(coin) {
            return Err(UpstreamError::UnexpectedData(format!("{coin} unavailable")));
        }

        // newest first, so callers cannot rely on upstream ordering
        let mut samples: Vec<FundingSample> = self
            .history
            .get(coin)
            .map(|all| {
                all.iter()
                    .filter(|s| s.time >= start_time && s.time <= end_time)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        samples.reverse();
        Ok(samples)
    }
}
