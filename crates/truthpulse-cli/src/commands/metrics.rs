//! The `truthpulse metrics` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use truthpulse_core::statistics::{aggregate, AggregateMetrics};
use truthpulse_core::traits::RecordStore;
use truthpulse_store::JsonDocumentStore;

pub async fn execute(
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let config = super::load_config(config, data_dir)?;
    let path = config.database_path();
    let store = JsonDocumentStore::open(&path)
        .await
        .with_context(|| format!("failed to open record store: {}", path.display()))?;
    let records = store.read_all().await?;
    let metrics = aggregate(records.iter().map(|r| &r.record));

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&metrics)?),
        _ => println!("{}", metrics_table(&metrics)),
    }
    Ok(())
}

fn metrics_table(metrics: &AggregateMetrics) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Responses"), Cell::new(metrics.total)]);
    table.add_row(vec![
        Cell::new("Quiz accuracy"),
        Cell::new(format!("{}%", metrics.accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("Average concern"),
        Cell::new(format!("{:.1}/10", metrics.concern_avg)),
    ]);
    for (intent, count) in &metrics.pay {
        table.add_row(vec![Cell::new(format!("Pay: {intent}")), Cell::new(count)]);
    }
    for (role, count) in &metrics.roles {
        table.add_row(vec![Cell::new(format!("Role: {role}")), Cell::new(count)]);
    }
    table
}
