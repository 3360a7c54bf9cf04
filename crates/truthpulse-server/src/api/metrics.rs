//! Aggregate metrics.

use axum::{extract::State, Json};

use truthpulse_core::statistics::AggregateMetrics;

use crate::error::ApiError;
use crate::AppState;

/// GET /api/metrics
///
/// Recomputed from every stored record on each call.
pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<AggregateMetrics>, ApiError> {
    Ok(Json(state.recorder.metrics().await?))
}
