//! Response ingestion.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use truthpulse_core::model::{RecordId, ResponseRecord};

use crate::error::ApiError;
use crate::AppState;

/// Body returned after a record is stored.
#[derive(Debug, Serialize)]
pub struct RecordedResponse {
    pub ok: bool,
    pub id: RecordId,
}

/// POST /api/analytics
///
/// Accepts a response record (legacy field names included), stores it, and
/// returns its id. Fields that cannot be read are stored as missing; only a
/// body that is not JSON at all is rejected.
pub async fn record_response(
    State(state): State<AppState>,
    payload: Result<Json<ResponseRecord>, JsonRejection>,
) -> Result<Json<RecordedResponse>, ApiError> {
    let Json(record) = payload?;
    tracing::debug!(
        answers = record.quiz_answers.len(),
        has_contact = record.has_contact_email(),
        "received response"
    );
    let stored = state.recorder.record(record).await?;
    Ok(Json(RecordedResponse {
        ok: true,
        id: stored.id,
    }))
}
