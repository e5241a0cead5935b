use thiserror::Error;

/// Anything that went wrong talking to the data provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected data from upstream: {0}")]
    UnexpectedData(String),
}

#[derive(Debug, Error)]
pub enum FundingError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Invalid request: {0}")]
    Validation(String),
}
