//! # QVIX Series Handler
//!
//! Serves the five upstream index-option volatility series through the
//! shared TTL cache. Payloads are passed through unmodified.

use axum::{
    extract::{Path, State},
    http::Uri,
    Json,
};
use tracing::{info, instrument};

use crate::errors::api_error::ApiError;
use crate::extractors::query_extractor::ForwardedQuery;
use crate::proxy::QvixSeries;
use crate::state::AppState;

/// Axum handler for `GET /api/{series}`.
///
/// # Errors
/// - Returns `404 Not Found` when `series` is not one of the known series.
/// - Returns `500 Internal Server Error` when the upstream call fails.
#[instrument(skip(state, query))]
pub async fn get_qvix_series(
    State(state): State<AppState>,
    Path(series): Path<String>,
    query: ForwardedQuery,
) -> Result<Json<serde_json::Value>, ApiError> {
    let series: QvixSeries = series
        .parse()
        .map_err(|_| ApiError::NotFound(format!("/api/{series}")))?;

    info!(series = %series, params = ?query.0, "Received series request.");

    let data = state.proxy.get(&series.endpoint(), query.0).await?;

    Ok(Json(data))
}

/// Fallback for every unmatched path.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
