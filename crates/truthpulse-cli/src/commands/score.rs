//! The `truthpulse score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use truthpulse_core::catalog::load_catalog_or_builtin;
use truthpulse_core::model::ResponseRecord;
use truthpulse_core::scorer::score;

pub fn execute(record_path: PathBuf, catalog: Option<PathBuf>, format: String) -> Result<()> {
    let catalog = load_catalog_or_builtin(catalog.as_deref())?;
    let content = std::fs::read_to_string(&record_path)
        .with_context(|| format!("failed to read record: {}", record_path.display()))?;
    let mut record: ResponseRecord = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse record: {}", record_path.display()))?;

    let dropped = record.normalize(&catalog);
    if dropped > 0 {
        tracing::warn!(dropped, "ignored answers for items outside the catalog");
    }
    let card = score(&record, &catalog);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&card)?),
        _ => {
            println!(
                "Progress: {}% ({}/{} checkpoints)",
                card.progress.percent, card.progress.satisfied, card.progress.total
            );
            println!("Accuracy: {}", card.accuracy);
            println!("{}", card.risk);
            println!("Willingness to pay: {}", card.pay_label);
            println!("Role: {}", card.role_label);
        }
    }
    Ok(())
}
