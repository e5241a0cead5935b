use crate::models::{FundingSample, SeriesPoint, SummaryStats};

/// Funding settles hourly.
pub const PERIODS_PER_YEAR: f64 = 24.0 * 365.0;

/// 24 hourly samples.
pub const DEFAULT_WINDOW: usize = 24;

/// Hourly funding rate to percent APR.
pub fn annualize(rate: f64) -> f64 {
    rate * 100.0 * PERIODS_PER_YEAR
}

pub fn annualized_points(samples: &[FundingSample]) -> Vec<SeriesPoint> {
    samples
        .iter()
        .map(|s| SeriesPoint {
            time: s.time,
            value: annualize(s.funding_rate),
        })
        .collect()
}

/// Trailing mean over at most `window` points ending at each index. The first
/// points average whatever is available, so the output has the input's length.
pub fn moving_average(points: &[SeriesPoint], window: usize) -> Vec<SeriesPoint> {
    let window = window.max(1);

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let trailing = &points[(i + 1).saturating_sub(window)..=i];
            let sum: f64 = trailing.iter().map(|p| p.value).sum();
            SeriesPoint {
                time: point.time,
                value: sum / trailing.len() as f64,
            }
        })
        .collect()
}

/// Percent-scale statistics; all zero for an empty series.
pub fn summary_stats(samples: &[FundingSample]) -> SummaryStats {
    let Some(last) = samples.last() else {
        return SummaryStats::default();
    };

    let rates = samples.iter().map(|s| s.funding_rate * 100.0);
    let sum: f64 = rates.clone().sum();
    let min = rates.clone().fold(f64::INFINITY, f64::min);
    let max = rates.fold(f64::NEG_INFINITY, f64::max);
    let avg = sum / samples.len() as f64;

    SummaryStats {
        avg,
        min,
        max,
        current: last.funding_rate * 100.0,
        apr: avg * PERIODS_PER_YEAR,
    }
}
