use std::collections::{HashMap, HashSet};

use crate::errors::FundingError;
use crate::history::{DAY_MS, MAX_HISTORY_DAYS, fetch_full_history, validate_days};
use crate::models::FundingSeries;
use crate::upstream::FundingSource;
use futures_util::future::join_all;

/// What a batch does when some coins fail to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Any failure fails the whole batch; no partial map is returned.
    #[default]
    FailFast,
    /// Failed coins are logged and left out of the result.
    BestEffort,
}

/// Fetches `days` of history ending now for every coin concurrently.
pub async fn fetch_batch(
    source: &dyn FundingSource,
    coins: &[String],
    days: u32,
    policy: BatchPolicy,
) -> Result<HashMap<String, FundingSeries>, FundingError> {
    let end_time = chrono::Utc::now().timestamp_millis();
    fetch_batch_at(source, coins, days, policy, end_time).await
}

/// Same as [`fetch_batch`] with an explicit snapshot instant shared by every coin.
pub async fn fetch_batch_at(
    source: &dyn FundingSource,
    coins: &[String],
    days: u32,
    policy: BatchPolicy,
    end_time: i64,
) -> Result<HashMap<String, FundingSeries>, FundingError> {
    validate_days(days, MAX_HISTORY_DAYS)?;
    if coins.is_empty() {
        return Err(FundingError::Validation("at least one coin is required".to_string()));
    }

    let start_time = end_time - i64::from(days) * DAY_MS;

    // coins form a set; keep first-seen order so fail-fast reports deterministically
    let mut seen = HashSet::new();
    let unique: Vec<&str> = coins
        .iter()
        .map(String::as_str)
        .filter(|coin| seen.insert(*coin))
        .collect();

    // every branch runs to completion before the policy is applied
    let results = join_all(unique.iter().map(|coin| async move {
        (*coin, fetch_full_history(source, coin, start_time, end_time).await)
    }))
    .await;

    let mut histories = HashMap::with_capacity(results.len());
    for (coin, result) in results {
        match result {
            Ok(series) => {
                histories.insert(coin.to_string(), series);
            }
            Err(e) if policy == BatchPolicy::FailFast => {
                tracing::error!("[{}] batch aborted, {coin} failed: {e}", source.name());
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!("[{}] dropping {coin} from batch: {e}", source.name());
            }
        }
    }

    tracing::info!(
        "[{}] batch fetched {}/{} coins over {days}d",
        source.name(),
        histories.len(),
        unique.len()
    );
    Ok(histories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::fake::{FakeSource, sample};

    const NOW: i64 = 100 * DAY_MS;

    fn coins(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn source() -> FakeSource {
        FakeSource::new()
            .with_history("X", vec![sample(NOW - DAY_MS, 0.0001), sample(NOW - 2 * DAY_MS, 0.0002)])
            .failing_for("Y")
    }

    #[tokio::test]
    async fn fail_fast_rejects_the_whole_batch() {
        let source = source();

        let result = fetch_batch_at(&source, &coins(&["X", "Y"]), 7, BatchPolicy::FailFast, NOW).await;

        assert!(matches!(result, Err(FundingError::Upstream(_))));
    }

    #[tokio::test]
    async fn fail_fast_reports_first_failing_coin_in_request_order() {
        let source = FakeSource::new().failing_for("Y").failing_for("Z");

        let err = fetch_batch_at(&source, &coins(&["A", "Y", "Z"]), 7, BatchPolicy::FailFast, NOW)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Y unavailable"), "{message}");
        assert!(!message.contains('Z'), "{message}");

        let requested: HashSet<String> = source.calls().into_iter().map(|(c, _, _)| c).collect();
        assert!(requested.contains("A"));
        assert!(requested.contains("Z"));
    }

    #[tokio::test]
    async fn best_effort_returns_only_successful_coins() {
        let source = source();

        let histories =
            fetch_batch_at(&source, &coins(&["X", "Y"]), 7, BatchPolicy::BestEffort, NOW)
                .await
                .unwrap();

        assert_eq!(histories.len(), 1);
        assert_eq!(histories["X"].len(), 2);
        assert!(!histories.contains_key("Y"));
    }

    #[tokio::test]
    async fn failure_does_not_cancel_siblings() {
        let source = source();

        let _ = fetch_batch_at(&source, &coins(&["Y", "X"]), 7, BatchPolicy::FailFast, NOW).await;

        let requested: HashSet<String> = source.calls().into_iter().map(|(c, _, _)| c).collect();
        assert!(requested.contains("X"));
        assert!(requested.contains("Y"));
    }

    #[tokio::test]
    async fn every_coin_shares_one_time_range() {
        let source = FakeSource::new();

        let histories =
            fetch_batch_at(&source, &coins(&["A", "B", "C"]), 3, BatchPolicy::FailFast, NOW)
                .await
                .unwrap();

        assert_eq!(histories.len(), 3);
        for series in histories.values() {
            assert_eq!(series.start_time, NOW - 3 * DAY_MS);
            assert_eq!(series.end_time, NOW);
        }
    }

    #[tokio::test]
    async fn duplicate_coins_are_fetched_once() {
        let source = FakeSource::new();

        let histories =
            fetch_batch_at(&source, &coins(&["A", "A"]), 1, BatchPolicy::FailFast, NOW)
                .await
                .unwrap();

        assert_eq!(histories.len(), 1);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_any_fetch() {
        let source = FakeSource::new();

        let zero_days = fetch_batch_at(&source, &coins(&["A"]), 0, BatchPolicy::FailFast, NOW).await;
        let no_coins = fetch_batch_at(&source, &[], 7, BatchPolicy::BestEffort, NOW).await;
        let too_many_days = fetch_batch_at(
            &source,
            &coins(&["A"]),
            MAX_HISTORY_DAYS + 1,
            BatchPolicy::BestEffort,
            NOW,
        )
        .await;

        assert!(matches!(zero_days, Err(FundingError::Validation(_))));
        assert!(matches!(too_many_days, Err(FundingError::Validation(_))));
        assert!(matches!(no_coins, Err(FundingError::Validation(_))));
        assert!(source.calls().is_empty());
    }
}
