use crate::errors::{FundingError, UpstreamError};
use crate::models::{FundingSample, FundingSeries};
use crate::upstream::FundingSource;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Widest window requested from the provider in one call.
pub const CHUNK_MS: i64 = 20 * DAY_MS;

/// Longest lookback accepted anywhere, about ten years.
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// `days` must lie in `1..=max_days`.
pub fn validate_days(days: u32, max_days: u32) -> Result<(), FundingError> {
    if days == 0 {
        return Err(FundingError::Validation("days must be at least 1".to_string()));
    }
    if days > max_days {
        return Err(FundingError::Validation(format!(
            "days must be at most {max_days}, got {days}"
        )));
    }
    Ok(())
}

/// Fetches the complete history for `coin` over `[start_time, end_time)`.
pub async fn fetch_full_history(
    source: &dyn FundingSource,
    coin: &str,
    start_time: i64,
    end_time: i64,
) -> Result<FundingSeries, UpstreamError> {
    fetch_full_history_chunked(source, coin, start_time, end_time, CHUNK_MS).await
}

/// Walks the range in consecutive `chunk_ms` windows, one request at a time.
/// Any failed chunk fails the whole call; no partial series is returned.
pub async fn fetch_full_history_chunked(
    source: &dyn FundingSource,
    coin: &str,
    start_time: i64,
    end_time: i64,
    chunk_ms: i64,
) -> Result<FundingSeries, UpstreamError> {
    if end_time <= start_time {
        return Ok(FundingSeries::empty(coin, start_time, end_time));
    }

    let chunk_ms = chunk_ms.max(1);
    let mut collected = Vec::new();
    let mut chunks = 0usize;
    let mut chunk_start = start_time;

    while chunk_start < end_time {
        let chunk_end = chunk_start.saturating_add(chunk_ms).min(end_time);

        tracing::debug!("[{}] {coin} chunk {chunk_start}..{chunk_end}", source.name());
        let samples = source
            .fetch_funding_chunk(coin, chunk_start, chunk_end)
            .await?;
        collected.extend(samples);

        chunks += 1;
        chunk_start = chunk_end;
    }

    let samples = merge_samples(collected);
    tracing::debug!(
        "[{}] {coin}: {} samples from {chunks} chunks",
        source.name(),
        samples.len()
    );

    Ok(FundingSeries {
        coin: coin.to_string(),
        start_time,
        end_time,
        samples,
    })
}

/// Sorts ascending by time and keeps the first sample for each timestamp.
pub fn merge_samples(mut samples: Vec<FundingSample>) -> Vec<FundingSample> {
    // stable, so equal timestamps keep their arrival order
    samples.sort_by_key(|s| s.time);
    samples.dedup_by_key(|s| s.time);
    samples
}
