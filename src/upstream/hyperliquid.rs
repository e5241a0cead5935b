use std::time::Duration;

use super::FundingSource;
use crate::errors::UpstreamError;
use crate::models::{AssetSummary, FundingSample};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request bodies accepted by the info endpoint
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum InfoRequest<'a> {
    #[serde(rename = "metaAndAssetCtxs")]
    MetaAndAssetCtxs,

    #[serde(rename = "fundingHistory", rename_all = "camelCase")]
    FundingHistory {
        coin: &'a str,
        start_time: i64,
        end_time: i64,
    },
}

impl InfoRequest<'_> {
    fn kind(&self) -> &'static str {
        match self {
            InfoRequest::MetaAndAssetCtxs => "metaAndAssetCtxs",
            InfoRequest::FundingHistory { .. } => "fundingHistory",
        }
    }
}

/// Numbers arrive as strings most of the time, occasionally as JSON numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(f64),
}

impl Decimal {
    fn to_f64(&self, field: &str) -> Result<f64, UpstreamError> {
        match self {
            Decimal::Number(n) => Ok(*n),
            Decimal::Text(s) if s.trim().is_empty() => Ok(0.0),
            Decimal::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                UpstreamError::UnexpectedData(format!("invalid {field}: {s:?}"))
            }),
        }
    }
}

/// Missing or null context fields count as zero.
fn decimal_or_zero(value: &Option<Decimal>, field: &str) -> Result<f64, UpstreamError> {
    value.as_ref().map_or(Ok(0.0), |d| d.to_f64(field))
}

#[derive(Debug, Deserialize)]
struct Meta {
    universe: Vec<UniverseEntry>,
}

#[derive(Debug, Deserialize)]
struct UniverseEntry {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetCtx {
    funding: Option<Decimal>,
    mark_px: Option<Decimal>,
    open_interest: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundingHistoryEntry {
    time: i64,
    funding_rate: Decimal,
    premium: Option<Decimal>,
}

/// Pairs `universe[i]` with `contexts[i]`. The two arrays must be the same
/// length; anything else is rejected rather than truncated.
fn decode_asset_metadata(payload: Value) -> Result<Vec<AssetSummary>, UpstreamError> {
    let (meta, contexts): (Meta, Vec<Option<AssetCtx>>) = serde_json::from_value(payload)?;

    if meta.universe.len() != contexts.len() {
        return Err(UpstreamError::UnexpectedData(format!(
            "universe has {} entries but {} asset contexts were returned",
            meta.universe.len(),
            contexts.len()
        )));
    }

    meta.universe
        .into_iter()
        .zip(contexts)
        .map(|(asset, ctx)| {
            let ctx = ctx.unwrap_or_default();
            Ok(AssetSummary {
                current_funding: decimal_or_zero(&ctx.funding, "funding")?,
                mark_price: decimal_or_zero(&ctx.mark_px, "markPx")?,
                open_interest: decimal_or_zero(&ctx.open_interest, "openInterest")?,
                name: asset.name,
            })
        })
        .collect()
}

/// A non-array payload (e.g. an error object) decodes to no samples.
fn decode_funding_history(payload: Value) -> Result<Vec<FundingSample>, UpstreamError> {
    if !payload.is_array() {
        tracing::debug!("fundingHistory returned a non-array payload, treating as empty");
        return Ok(Vec::new());
    }

    let entries: Vec<FundingHistoryEntry> = serde_json::from_value(payload)?;

    entries
        .into_iter()
        .map(|entry| {
            Ok(FundingSample {
                time: entry.time,
                funding_rate: entry.funding_rate.to_f64("fundingRate")?,
                premium: decimal_or_zero(&entry.premium, "premium")?,
            })
        })
        .collect()
}

pub struct Hyperliquid {
    client: reqwest::Client,
    base_url: String,
}

impl Hyperliquid {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// POSTs one info request and returns the decoded JSON body.
    async fn post(&self, request: &InfoRequest<'_>) -> Result<Value, UpstreamError> {
        let kind = request.kind();
        metrics::counter!("upstream_requests_total", "type" => kind).increment(1);

        let result = self.send(request).await;
        if let Err(e) = &result {
            metrics::counter!("upstream_failures_total", "type" => kind).increment(1);
            tracing::warn!("[{}] {kind} request failed: {e}", self.name());
        }
        result
    }

    async fn send(&self, request: &InfoRequest<'_>) -> Result<Value, UpstreamError> {
        let body = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl FundingSource for Hyperliquid {
    fn name(&self) -> &'static str {
        "hyperliquid"
    }

    async fn fetch_asset_metadata(&self) -> Result<Vec<AssetSummary>, UpstreamError> {
        let payload = self.post(&InfoRequest::MetaAndAssetCtxs).await?;
        let assets = decode_asset_metadata(payload)?;
        tracing::debug!("[{}] decoded {} assets", self.name(), assets.len());
        Ok(assets)
    }

    async fn fetch_funding_chunk(
        &self,
        coin: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<FundingSample>, UpstreamError> {
        let payload = self
            .post(&InfoRequest::FundingHistory {
                coin,
                start_time,
                end_time,
            })
            .await?;
        decode_funding_history(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn funding_history_request_body_matches_provider_format() {
        let body = serde_json::to_value(InfoRequest::FundingHistory {
            coin: "ETH",
            start_time: 1_000,
            end_time: 2_000,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"type": "fundingHistory", "coin": "ETH", "startTime": 1000, "endTime": 2000})
        );
        assert_eq!(
            serde_json::to_value(InfoRequest::MetaAndAssetCtxs).unwrap(),
            json!({"type": "metaAndAssetCtxs"})
        );
    }

    #[test]
    fn metadata_pairs_universe_and_contexts_by_index() {
        let payload = json!([
            {"universe": [{"name": "BTC", "szDecimals": 5}, {"name": "ETH", "szDecimals": 4}]},
            [
                {"funding": "0.0000125", "markPx": "50000", "openInterest": "100"},
                {"funding": "-0.00001", "markPx": "3000.5", "openInterest": "2000"}
            ]
        ]);

        let assets = decode_asset_metadata(payload).unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].name, "BTC");
        assert_eq!(assets[0].mark_price, 50_000.0);
        assert_eq!(assets[0].open_interest_usd(), 5_000_000.0);
        assert_eq!(assets[1].name, "ETH");
        assert_eq!(assets[1].current_funding, -0.00001);
    }

    #[test]
    fn missing_context_fields_default_to_zero() {
        let payload = json!([
            {"universe": [{"name": "NEW"}, {"name": "OLD"}]},
            [{"markPx": "1.5"}, null]
        ]);

        let assets = decode_asset_metadata(payload).unwrap();

        assert_eq!(assets[0].current_funding, 0.0);
        assert_eq!(assets[0].mark_price, 1.5);
        assert_eq!(assets[0].open_interest, 0.0);
        assert_eq!(assets[1].mark_price, 0.0);
    }

    #[test]
    fn metadata_length_mismatch_is_rejected() {
        let payload = json!([
            {"universe": [{"name": "BTC"}, {"name": "ETH"}]},
            [{"funding": "0.0001", "markPx": "1", "openInterest": "1"}]
        ]);

        let err = decode_asset_metadata(payload).unwrap_err();
        assert!(matches!(err, UpstreamError::UnexpectedData(_)));
    }

    #[test]
    fn malformed_metadata_is_a_parse_error() {
        let err = decode_asset_metadata(json!({"error": "bad request"})).unwrap_err();
        assert!(matches!(err, UpstreamError::Parse(_)));
    }

    #[test]
    fn funding_history_accepts_string_and_number_rates() {
        let payload = json!([
            {"coin": "BTC", "time": 3_600_000, "fundingRate": "0.0000125", "premium": "-0.0001"},
            {"coin": "BTC", "time": 7_200_000, "fundingRate": 0.00002, "premium": 0.0}
        ]);

        let samples = decode_funding_history(payload).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].funding_rate, 0.0000125);
        assert_eq!(samples[0].premium, -0.0001);
        assert_eq!(samples[1].time, 7_200_000);
        assert_eq!(samples[1].funding_rate, 0.00002);
    }

    #[test]
    fn non_array_funding_payload_is_empty() {
        assert!(decode_funding_history(json!({"error": "rate limited"})).unwrap().is_empty());
        assert!(decode_funding_history(json!(null)).unwrap().is_empty());
    }

    #[test]
    fn unparsable_funding_rate_is_unexpected_data() {
        let payload = json!([{"time": 1, "fundingRate": "abc", "premium": "0"}]);
        let err = decode_funding_history(payload).unwrap_err();
        assert!(matches!(err, UpstreamError::UnexpectedData(_)));
    }
}
