//! Demonstration data.

use axum::{extract::State, Json};

use crate::api::analytics::RecordedResponse;
use crate::error::ApiError;
use crate::AppState;

/// GET /api/seed
///
/// Only routed when `enable_seed` is set.
pub async fn seed_record(State(state): State<AppState>) -> Result<Json<RecordedResponse>, ApiError> {
    let stored = state.recorder.seed().await?;
    tracing::info!(id = %stored.id, "seeded sample record");
    Ok(Json(RecordedResponse {
        ok: true,
        id: stored.id,
    }))
}
