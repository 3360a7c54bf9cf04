//! Core trait definitions for record persistence and tabular export.
//!
//! These async traits are implemented by the `truthpulse-store` crate.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{ExportError, StoreError};
use crate::export::ExportFormat;
use crate::model::{ResponseRecord, StoredRecord};

// ---------------------------------------------------------------------------
// Record store trait
// ---------------------------------------------------------------------------

/// Append-only durable storage of response records.
///
/// `append` must be atomic with respect to `read_all`: a concurrent reader
/// sees either the whole record or none of it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Human-readable store name (e.g. "json-document").
    fn name(&self) -> &str;

    /// Assign an id and timestamp, store the record, and return it.
    async fn append(&self, record: ResponseRecord) -> Result<StoredRecord, StoreError>;

    /// Every record appended so far, in no guaranteed order.
    async fn read_all(&self) -> Result<Vec<StoredRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// Tabular export trait
// ---------------------------------------------------------------------------

/// A derived, row-per-record mirror of the store for offline analysis.
#[async_trait]
pub trait TabularExport: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Location of the exported file.
    fn path(&self) -> &Path;

    /// Create the file with its header row if it does not exist yet.
    async fn ensure_created(&self) -> Result<(), ExportError>;

    /// Append one row for a freshly stored record.
    async fn append_row(&self, record: &StoredRecord) -> Result<(), ExportError>;

    /// Replace the whole file with one row per record, in the given order.
    async fn rebuild(&self, records: &[StoredRecord]) -> Result<(), ExportError>;
}
