//! truthpulse-store — Record store and export implementations.
//!
//! This crate provides concrete implementations of the [`RecordStore`] and
//! [`TabularExport`] traits defined in `truthpulse-core`.
//!
//! [`RecordStore`]: truthpulse_core::traits::RecordStore
//! [`TabularExport`]: truthpulse_core::traits::TabularExport

pub mod csv_export;
pub mod document;
pub mod memory;
pub mod xlsx_export;

pub use csv_export::CsvExport;
pub use document::JsonDocumentStore;
pub use memory::MemoryStore;
pub use xlsx_export::XlsxExport;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use truthpulse_core::traits::{RecordStore, TabularExport};

/// Files making up a data directory.
#[derive(Debug, Clone, Copy)]
pub struct DataFiles<'a> {
    pub database: &'a str,
    pub xlsx_export: &'a str,
    /// Optional CSV mirror kept next to the workbook.
    pub csv_export: Option<&'a str>,
}

/// Open the JSON document store and its exports under `data_dir`.
///
/// The directory is created if needed. The workbook is rebuilt from the
/// stored records so its row cache matches the store, and the CSV mirror
/// gets its header so both files exist from startup.
pub async fn open_data_dir(
    data_dir: &Path,
    files: DataFiles<'_>,
) -> Result<(Arc<JsonDocumentStore>, Vec<Arc<dyn TabularExport>>)> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let store = JsonDocumentStore::open(data_dir.join(files.database))
        .await
        .with_context(|| format!("failed to open record store in {}", data_dir.display()))?;
    let records = store.read_all().await?;

    let xlsx = XlsxExport::new(data_dir.join(files.xlsx_export));
    xlsx.rebuild(&records)
        .await
        .with_context(|| format!("failed to write export {}", xlsx.path().display()))?;
    let mut exports: Vec<Arc<dyn TabularExport>> = vec![Arc::new(xlsx)];

    if let Some(csv_file) = files.csv_export {
        let csv = CsvExport::new(data_dir.join(csv_file));
        csv.ensure_created()
            .await
            .with_context(|| format!("failed to create export {}", csv.path().display()))?;
        exports.push(Arc::new(csv));
    }

    tracing::info!(
        store = store.name(),
        records = records.len(),
        exports = exports.len(),
        "opened data directory"
    );
    Ok((Arc::new(store), exports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthpulse_core::export::ExportFormat;

    #[tokio::test]
    async fn opens_store_and_both_exports() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("db.json"),
            r#"{"analytics":[{"id":"V1StGXR8_Z5jdHi6B-myT","ts":"2024-05-01T10:00:00.000Z","concernLevel":4}]}"#,
        )
        .unwrap();

        let files = DataFiles {
            database: "db.json",
            xlsx_export: "analytics.xlsx",
            csv_export: Some("analytics.csv"),
        };
        let (store, exports) = open_data_dir(&data_dir, files).await.unwrap();

        assert_eq!(store.len().await, 1);
        let formats: Vec<ExportFormat> = exports.iter().map(|e| e.format()).collect();
        assert_eq!(formats, [ExportFormat::Xlsx, ExportFormat::Csv]);
        assert!(data_dir.join("analytics.xlsx").is_file());
        assert!(data_dir.join("analytics.csv").is_file());
    }

    #[tokio::test]
    async fn csv_mirror_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles {
            database: "db.json",
            xlsx_export: "analytics.xlsx",
            csv_export: None,
        };
        let (store, exports) = open_data_dir(dir.path(), files).await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(exports.len(), 1);
        assert!(!dir.path().join("analytics.csv").exists());
    }
}
