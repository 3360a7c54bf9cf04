//! File-backed record store holding one JSON document.
//!
//! The document has the shape `{ "analytics": [ <record>, ... ] }`. Every
//! append rewrites it through a temporary sibling file that is renamed into
//! place, so the file on disk is always a complete document.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use truthpulse_core::error::StoreError;
use truthpulse_core::model::{ResponseRecord, StoredRecord};
use truthpulse_core::traits::RecordStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    analytics: Vec<StoredRecord>,
}

/// Append-only store persisted as a single JSON document.
///
/// Readers see an in-memory snapshot that is extended only after the new
/// document has been renamed into place.
pub struct JsonDocumentStore {
    path: PathBuf,
    records: RwLock<Vec<StoredRecord>>,
    /// Held for the whole write-rename-publish sequence of one append.
    writer: Mutex<()>,
}

impl JsonDocumentStore {
    /// Open the store at `path`. A missing or empty file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_document(&content, &path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), records = records.len(), "opened document store");

        Ok(Self {
            path,
            records: RwLock::new(records),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn parse_document(content: &str, path: &Path) -> Result<Vec<StoredRecord>, StoreError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: Document =
        serde_json::from_str(content).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(document.analytics)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "db.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `bytes` to a temporary sibling of `path`, then rename over `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)
}

#[async_trait]
impl RecordStore for JsonDocumentStore {
    fn name(&self) -> &str {
        "json-document"
    }

    async fn append(&self, record: ResponseRecord) -> Result<StoredRecord, StoreError> {
        let _writer = self.writer.lock().await;
        let stored = StoredRecord::stamp(record);

        let bytes = {
            let current = self.records.read().await;
            let mut analytics = current.clone();
            analytics.push(stored.clone());
            serde_json::to_vec_pretty(&Document { analytics })?
        };

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        self.records.write().await.push(stored.clone());
        tracing::debug!(id = %stored.id, path = %self.path.display(), "appended record");
        Ok(stored)
    }

    async fn read_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
