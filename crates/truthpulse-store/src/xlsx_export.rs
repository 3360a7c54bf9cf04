//! Spreadsheet mirror of the record store.
//!
//! An xlsx workbook cannot be appended to in place, so the export keeps the
//! rows it has written in memory and rewrites the whole workbook on every
//! change. Seed the cache with [`TabularExport::rebuild`] when opening an
//! existing data directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tokio::sync::Mutex;

use truthpulse_core::error::ExportError;
use truthpulse_core::export::{export_row, ExportFormat, EXPORT_HEADER, NUMERIC_COLUMNS};
use truthpulse_core::model::StoredRecord;
use truthpulse_core::traits::TabularExport;

use crate::csv_export::ensure_parent;

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Analytics";

/// Writes one worksheet row per stored record under a fixed header.
pub struct XlsxExport {
    path: PathBuf,
    rows: Mutex<Vec<Vec<String>>>,
}

impl XlsxExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Number of data rows currently mirrored.
    pub async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

fn xlsx_err(e: XlsxError) -> ExportError {
    match e {
        XlsxError::IoError(io) => ExportError::Io(io),
        other => ExportError::Encode(other.to_string()),
    }
}

fn task_err(e: tokio::task::JoinError) -> ExportError {
    ExportError::Task(e.to_string())
}

fn write_workbook(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    ensure_parent(path)?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;

    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(xlsx_err)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let number = NUMERIC_COLUMNS
                .contains(&col)
                .then(|| value.parse::<f64>().ok())
                .flatten();
            let written = match number {
                Some(n) => sheet.write_number(row_num, col as u16, n),
                None => sheet.write_string(row_num, col as u16, value.as_str()),
            };
            written.map_err(xlsx_err)?;
        }
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analytics.xlsx".to_string());
    let tmp = path.with_file_name(format!(".{name}.tmp"));
    workbook.save(&tmp).map_err(xlsx_err)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl XlsxExport {
    async fn write(&self, rows: Vec<Vec<String>>) -> Result<(), ExportError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_workbook(&path, &rows))
            .await
            .map_err(task_err)?
    }
}

#[async_trait]
impl TabularExport for XlsxExport {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_created(&self) -> Result<(), ExportError> {
        let rows = self.rows.lock().await;
        if self.exists() {
            return Ok(());
        }
        self.write(rows.clone()).await
    }

    async fn append_row(&self, record: &StoredRecord) -> Result<(), ExportError> {
        let mut rows = self.rows.lock().await;
        rows.push(export_row(record));
        self.write(rows.clone()).await
    }

    async fn rebuild(&self, records: &[StoredRecord]) -> Result<(), ExportError> {
        let mut rows = self.rows.lock().await;
        *rows = records.iter().map(export_row).collect();
        let count = rows.len();
        self.write(rows.clone()).await?;
        tracing::info!(rows = count, path = %self.path.display(), "rebuilt export");
        Ok(())
    }
}
