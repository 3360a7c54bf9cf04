//! Tabular export downloads.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use truthpulse_core::export::ExportFormat;

use crate::error::ApiError;
use crate::AppState;

/// GET /api/analytics.xlsx
pub async fn download_xlsx(State(state): State<AppState>) -> Result<Response, ApiError> {
    download(&state, ExportFormat::Xlsx).await
}

/// GET /api/analytics.csv
pub async fn download_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    download(&state, ExportFormat::Csv).await
}

async fn download(state: &AppState, format: ExportFormat) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound("export file not found yet".to_string());

    let export = state.recorder.export(format).ok_or_else(not_found)?;
    let path = export.path();
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("analytics.{}", format.extension()));
    tracing::debug!(%format, bytes = bytes.len(), "serving export");
    Ok((
        [
            (header::CONTENT_TYPE, format.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
