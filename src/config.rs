use crate::history::MAX_HISTORY_DAYS;
use crate::ranking::DEFAULT_CANDIDATE_LIMIT;
use anyhow::Context;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_url: String,
    pub api_port: u16,
    pub default_history_days: u32,
    pub max_history_days: u32,
    pub min_oi_usd: f64,
    pub top_n: usize,
    pub rank_candidates: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: "https://api.hyperliquid.xyz/info".to_string(),
            api_port: 3001,
            default_history_days: 30,
            max_history_days: MAX_HISTORY_DAYS,
            min_oi_usd: 1_000_000.0,
            top_n: 5,
            rank_candidates: DEFAULT_CANDIDATE_LIMIT,
            request_timeout_secs: 30,
        }
    }
}

/// Reads `name` and parses it, falling back to `default` when unset or blank.
fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let upstream_url = env::var("UPSTREAM_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.upstream_url);

        let config = Self {
            upstream_url,
            api_port: env_or("API_PORT", defaults.api_port)?,
            default_history_days: env_or("DEFAULT_HISTORY_DAYS", defaults.default_history_days)?,
            max_history_days: env_or("MAX_HISTORY_DAYS", defaults.max_history_days)?,
            min_oi_usd: env_or("MIN_OI_USD", defaults.min_oi_usd)?,
            top_n: env_or("TOP_N", defaults.top_n)?,
            rank_candidates: env_or("RANK_CANDIDATES", defaults.rank_candidates)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every request fail or return nothing.
    fn validate(&self) -> anyhow::Result<()> {
        if self.max_history_days == 0 || self.max_history_days > MAX_HISTORY_DAYS {
            anyhow::bail!("MAX_HISTORY_DAYS must be between 1 and {MAX_HISTORY_DAYS}");
        }
        if self.default_history_days == 0 || self.default_history_days > self.max_history_days {
            anyhow::bail!(
                "DEFAULT_HISTORY_DAYS must be between 1 and {}",
                self.max_history_days
            );
        }
        if !self.min_oi_usd.is_finite() || self.min_oi_usd < 0.0 {
            anyhow::bail!("MIN_OI_USD must be a non-negative number");
        }
        if self.top_n == 0 {
            anyhow::bail!("TOP_N must be at least 1");
        }
        if self.rank_candidates == 0 {
            anyhow::bail!("RANK_CANDIDATES must be at least 1");
        }
        Ok(())
    }
}
