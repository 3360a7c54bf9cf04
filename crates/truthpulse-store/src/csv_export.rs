//! CSV mirror of the record store.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use truthpulse_core::error::ExportError;
use truthpulse_core::export::{export_row, ExportFormat, EXPORT_HEADER};
use truthpulse_core::model::StoredRecord;
use truthpulse_core::traits::TabularExport;

/// Writes one CSV row per stored record under a fixed header.
pub struct CsvExport {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

fn encode_err(e: csv::Error) -> ExportError {
    if e.is_io_error() {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => ExportError::Io(io),
            other => ExportError::Encode(format!("{other:?}")),
        }
    } else {
        ExportError::Encode(e.to_string())
    }
}

fn task_err(e: tokio::task::JoinError) -> ExportError {
    ExportError::Task(e.to_string())
}

pub(crate) fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// Open for appending; returns the writer and whether the header is needed.
fn open_append(path: &Path) -> Result<(csv::Writer<File>, bool), ExportError> {
    ensure_parent(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    Ok((csv::Writer::from_writer(file), needs_header))
}

fn append_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    let (mut writer, needs_header) = open_append(path)?;
    if needs_header {
        writer.write_record(EXPORT_HEADER).map_err(encode_err)?;
    }
    for row in rows {
        writer.write_record(row).map_err(encode_err)?;
    }
    writer.flush()?;
    Ok(())
}

fn rewrite(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "analytics.csv".to_string());
    let tmp = path.with_file_name(format!(".{name}.tmp"));

    let mut writer = csv::Writer::from_path(&tmp).map_err(encode_err)?;
    writer.write_record(EXPORT_HEADER).map_err(encode_err)?;
    for row in rows {
        writer.write_record(row).map_err(encode_err)?;
    }
    writer.flush()?;
    drop(writer);

    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl TabularExport for CsvExport {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_created(&self) -> Result<(), ExportError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_rows(&path, &[]))
            .await
            .map_err(task_err)?
    }

    async fn append_row(&self, record: &StoredRecord) -> Result<(), ExportError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let row = export_row(record);
        tokio::task::spawn_blocking(move || append_rows(&path, &[row]))
            .await
            .map_err(task_err)?
    }

    async fn rebuild(&self, records: &[StoredRecord]) -> Result<(), ExportError> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        let rows: Vec<Vec<String>> = records.iter().map(export_row).collect();
        let count = rows.len();
        tokio::task::spawn_blocking(move || rewrite(&path, &rows))
            .await
            .map_err(task_err)??;
        tracing::info!(rows = count, path = %self.path.display(), "rebuilt export");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthpulse_core::model::{PayIntent, ResponseRecord, Role};

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn stored(role: Role) -> StoredRecord {
        StoredRecord::stamp(ResponseRecord {
            role: Some(role),
            willingness_to_pay: Some(PayIntent::Yes),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn ensure_created_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("analytics.csv"));
        assert!(!export.exists());

        export.ensure_created().await.unwrap();
        export.ensure_created().await.unwrap();

        let rows = read_rows(export.path());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], EXPORT_HEADER);
    }

    #[tokio::test]
    async fn append_creates_file_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("nested").join("analytics.csv"));
        let record = stored(Role::Consumer);

        export.append_row(&record).await.unwrap();
        export.append_row(&stored(Role::Professional)).await.unwrap();

        let rows = read_rows(export.path());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "id");
        assert_eq!(rows[1][0], record.id.to_string());
        assert_eq!(rows[1][2], "Consumer");
        assert_eq!(rows[2][2], "Professional");
        assert_eq!(rows[2][9], "Yes");
    }

    #[tokio::test]
    async fn rebuild_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("analytics.csv"));
        export.append_row(&stored(Role::Consumer)).await.unwrap();

        let records = vec![
            stored(Role::BusinessOwner),
            stored(Role::Other("Journalist".into())),
        ];
        export.rebuild(&records).await.unwrap();

        let rows = read_rows(export.path());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], records[0].id.to_string());
        assert_eq!(rows[1][2], "BusinessOwner");
        assert_eq!(rows[2][2], "Journalist");
    }

    #[tokio::test]
    async fn rebuild_of_nothing_leaves_header() {
        let dir = tempfile::tempdir().unwrap();
        let export = CsvExport::new(dir.path().join("analytics.csv"));
        export.rebuild(&[]).await.unwrap();
        assert_eq!(read_rows(export.path()), vec![EXPORT_HEADER.to_vec()]);
    }
}
