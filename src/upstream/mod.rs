use crate::errors::UpstreamError;
use crate::models::{AssetSummary, FundingSample};
use async_trait::async_trait;

pub mod hyperliquid;

#[cfg(test)]
pub mod fake;

/// A provider of asset metadata and bounded funding-history windows.
#[async_trait]
pub trait FundingSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current metadata and market context for every listed asset.
    async fn fetch_asset_metadata(&self) -> Result<Vec<AssetSummary>, UpstreamError>;

    /// One bounded history request. The caller keeps `end_time - start_time`
    /// within the provider's per-request limit.
    async fn fetch_funding_chunk(
        &self,
        coin: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<FundingSample>, UpstreamError>;
}
