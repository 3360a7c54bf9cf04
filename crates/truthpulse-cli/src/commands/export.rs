//! The `truthpulse export` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use truthpulse_core::export::ExportFormat;
use truthpulse_core::traits::{RecordStore, TabularExport};
use truthpulse_store::{CsvExport, JsonDocumentStore, XlsxExport};

pub async fn execute(
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = super::load_config(config, data_dir)?;
    let db_path = config.database_path();
    let store = JsonDocumentStore::open(&db_path)
        .await
        .with_context(|| format!("failed to open record store: {}", db_path.display()))?;
    let records = store.read_all().await?;

    let output = output.unwrap_or_else(|| config.export_path(format));
    let export: Arc<dyn TabularExport> = match format {
        ExportFormat::Xlsx => Arc::new(XlsxExport::new(&output)),
        ExportFormat::Csv => Arc::new(CsvExport::new(&output)),
    };
    export
        .rebuild(&records)
        .await
        .with_context(|| format!("failed to write export: {}", output.display()))?;

    println!(
        "Wrote {} row(s) to {} ({format})",
        records.len(),
        output.display()
    );
    Ok(())
}
