use super::AppState;
use super::models::{AssetsQuery, BatchRequest, DerivedQuery, HistoryQuery, TopQuery};
use crate::errors::FundingError;
use crate::models::{AssetSummary, FundingSample, RankedAsset};
use crate::series::DEFAULT_WINDOW;
use crate::service::{DerivedSeries, filter_assets};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

impl IntoResponse for FundingError {
    fn into_response(self) -> Response {
        let status = match &self {
            FundingError::Validation(_) => StatusCode::BAD_REQUEST,
            FundingError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// GET /health — simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// GET /api/assets — every listed asset, optionally filtered by `search`
pub async fn get_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetsQuery>,
) -> Result<Json<Vec<AssetSummary>>, FundingError> {
    let assets = state.service.get_assets().await?;
    let assets = match query.search {
        Some(term) => filter_assets(assets, &term),
        None => assets,
    };
    Ok(Json(assets))
}

/// GET /api/funding/{coin} — full history over `days` (default from config)
pub async fn get_funding_history(
    State(state): State<Arc<AppState>>,
    Path(coin): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<FundingSample>>, FundingError> {
    let days = query.days.unwrap_or(state.config.default_history_days);
    let series = state.service.get_funding_history(&coin, days).await?;
    Ok(Json(series.samples))
}

/// GET /api/funding/{coin}/derived — stats, annualized and smoothed series
pub async fn get_derived_series(
    State(state): State<Arc<AppState>>,
    Path(coin): Path<String>,
    Query(query): Query<DerivedQuery>,
) -> Result<Json<DerivedSeries>, FundingError> {
    let days = query.days.unwrap_or(state.config.default_history_days);
    let window = query.window.unwrap_or(DEFAULT_WINDOW);
    let derived = state.service.get_derived_series(&coin, days, window).await?;
    Ok(Json(derived))
}

/// POST /api/funding/batch — histories for several coins, all or nothing
pub async fn get_funding_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<HashMap<String, Vec<FundingSample>>>, FundingError> {
    let days = request.days.unwrap_or(state.config.default_history_days);
    let histories = state
        .service
        .get_funding_history_batch(&request.coins, days)
        .await?;

    let body = histories
        .into_iter()
        .map(|(coin, series)| (coin, series.samples))
        .collect();
    Ok(Json(body))
}

/// GET /api/top — best average funding among liquid assets
pub async fn get_top_performers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<RankedAsset>>, FundingError> {
    let config = &state.config;
    let assets = state.service.get_assets().await?;

    let ranked = state
        .service
        .get_top_performers(
            &assets,
            query.days.unwrap_or(config.default_history_days),
            query.min_oi_usd.unwrap_or(config.min_oi_usd),
            query.top_n.unwrap_or(config.top_n),
        )
        .await?;
    Ok(Json(ranked))
}
