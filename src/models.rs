use serde::{Deserialize, Serialize};

/// Snapshot of one perpetual market as returned by a metadata fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub name: String,
    pub current_funding: f64,
    pub mark_price: f64,
    pub open_interest: f64,
}

impl AssetSummary {
    /// Open interest converted to USD at the mark price.
    pub fn open_interest_usd(&self) -> f64 {
        self.open_interest * self.mark_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSample {
    /// ms since epoch
    pub time: i64,
    pub funding_rate: f64,
    pub premium: f64,
}

/// Funding history of one coin over `[start_time, end_time)`.
/// Samples are strictly ascending by `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSeries {
    pub coin: String,
    pub start_time: i64,
    pub end_time: i64,
    pub samples: Vec<FundingSample>,
}

impl FundingSeries {
    pub fn empty(coin: &str, start_time: i64, end_time: i64) -> Self {
        Self {
            coin: coin.to_string(),
            start_time,
            end_time,
            samples: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAsset {
    pub name: String,
    /// Mean funding rate as percent APR
    pub avg_annualized_rate: f64,
    pub open_interest_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

/// Display statistics for a series, all on percent scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SummaryStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub current: f64,
    /// `avg` scaled to a yearly percentage
    pub apr: f64,
}
