//! Response recording orchestrator.
//!
//! Coordinates the record store, the best-effort tabular exports, and the
//! aggregate metrics fold.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::QuizCatalog;
use crate::error::{RecordError, StoreError};
use crate::export::ExportFormat;
use crate::model::{
    BusinessProfile, Contact, PayIntent, QuizAnswer, ResponseRecord, Role, ScanResult,
    StoredRecord, Verdict, YesNo,
};
use crate::statistics::{aggregate, AggregateMetrics};
use crate::traits::{RecordStore, TabularExport};

/// Turns submitted responses into stored records and stored records into
/// metrics.
pub struct Recorder {
    store: Arc<dyn RecordStore>,
    exports: Vec<Arc<dyn TabularExport>>,
    catalog: Arc<QuizCatalog>,
    require_contact: bool,
    /// Serializes append + export so export rows follow append order.
    write_lock: Mutex<()>,
}

impl Recorder {
    pub fn new(
        store: Arc<dyn RecordStore>,
        exports: Vec<Arc<dyn TabularExport>>,
        catalog: Arc<QuizCatalog>,
    ) -> Self {
        Self {
            store,
            exports,
            catalog,
            require_contact: true,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_require_contact(mut self, require: bool) -> Self {
        self.require_contact = require;
        self
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn exports(&self) -> &[Arc<dyn TabularExport>] {
        &self.exports
    }

    /// The first configured export of the given format.
    pub fn export(&self, format: ExportFormat) -> Option<&Arc<dyn TabularExport>> {
        self.exports.iter().find(|e| e.format() == format)
    }

    /// Normalize, append, and mirror one submitted response.
    pub async fn record(&self, mut record: ResponseRecord) -> Result<StoredRecord, RecordError> {
        if self.require_contact && !record.has_contact_email() {
            return Err(RecordError::MissingContact);
        }

        let dropped = record.normalize(&self.catalog);
        if dropped > 0 {
            tracing::warn!(
                dropped,
                catalog_len = self.catalog.len(),
                "dropped quiz answers for unknown items"
            );
        }

        let _guard = self.write_lock.lock().await;
        let stored = self.store.append(record).await?;
        tracing::info!(id = %stored.id, store = self.store.name(), "recorded response");

        for export in &self.exports {
            if let Err(e) = export.append_row(&stored).await {
                tracing::warn!(
                    id = %stored.id,
                    format = %export.format(),
                    path = %export.path().display(),
                    "export append failed: {e}"
                );
            }
        }

        Ok(stored)
    }

    /// Aggregate metrics over every stored record, recomputed on each call.
    pub async fn metrics(&self) -> Result<AggregateMetrics, StoreError> {
        let records = self.store.read_all().await?;
        tracing::debug!(count = records.len(), "computing aggregate metrics");
        Ok(aggregate(records.iter().map(|r| &r.record)))
    }

    /// Append the fixed demonstration record.
    pub async fn seed(&self) -> Result<StoredRecord, RecordError> {
        self.record(seed_record()).await
    }
}

/// The sample response used to populate an empty deployment.
pub fn seed_record() -> ResponseRecord {
    ResponseRecord {
        quiz_answers: vec![
            QuizAnswer {
                item_index: 0,
                choice: Verdict::Real,
                correct: false,
            },
            QuizAnswer {
                item_index: 1,
                choice: Verdict::Real,
                correct: false,
            },
        ],
        encounter_level: Some(2),
        concern_level: Some(7),
        damage_level: Some(8),
        would_use_tool: Some(YesNo::Yes),
        willingness_to_pay: Some(PayIntent::Maybe),
        role: Some(Role::Professional),
        business_profile: Some(BusinessProfile {
            verify: Some(YesNo::No),
            damage: Some(YesNo::No),
            api: Some(YesNo::No),
            size: Some("1–10".into()),
            demo: Some(YesNo::No),
        }),
        scan_result: Some(ScanResult {
            score: 82,
            label: Verdict::Real,
            explanation: "Stable lighting".into(),
        }),
        contact: Some(Contact {
            name: "Seed User".into(),
            email: "seed@example.com".into(),
            role: Some(Role::Professional),
        }),
    }
}
