//! In-process record store for tests and ephemeral runs.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use truthpulse_core::error::StoreError;
use truthpulse_core::model::{ResponseRecord, StoredRecord};
use truthpulse_core::traits::RecordStore;

/// A record store that keeps everything in memory.
///
/// Nothing survives the process. Can optionally be primed with records and
/// counts appends for assertions.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StoredRecord>>,
    append_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `records`.
    pub fn with_records(records: Vec<StoredRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            append_count: AtomicU32::new(0),
        }
    }

    /// Number of successful appends since creation.
    pub fn append_count(&self) -> u32 {
        self.append_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, record: ResponseRecord) -> Result<StoredRecord, StoreError> {
        let stored = StoredRecord::stamp(record);
        self.records.write().await.push(stored.clone());
        self.append_count.fetch_add(1, Ordering::Relaxed);
        Ok(stored)
    }

    async fn read_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
