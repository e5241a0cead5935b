use serde::Deserialize;

/// Query for GET /api/assets
#[derive(Debug, Default, Deserialize)]
pub struct AssetsQuery {
    pub search: Option<String>,
}

/// Query for GET /api/funding/{coin}
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

/// Query for GET /api/funding/{coin}/derived
#[derive(Debug, Default, Deserialize)]
pub struct DerivedQuery {
    pub days: Option<u32>,
    pub window: Option<usize>,
}

/// Body for POST /api/funding/batch
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub coins: Vec<String>,
    pub days: Option<u32>,
}

/// Query for GET /api/top
#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub days: Option<u32>,
    pub min_oi_usd: Option<f64>,
    pub top_n: Option<usize>,
}
