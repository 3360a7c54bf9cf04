//! The `truthpulse init` command.

use std::path::Path;

use anyhow::Result;

use truthpulse_server::config::SAMPLE_CONFIG;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("truthpulse.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("catalog.toml"), SAMPLE_CATALOG)?;

    println!("\nNext steps:");
    println!("  1. Set `catalog = \"catalog.toml\"` in truthpulse.toml to use your own items");
    println!("  2. Run: truthpulse validate --catalog catalog.toml");
    println!("  3. Run: truthpulse serve");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CATALOG: &str = r#"# Quiz items, in the order they are shown.

[[items]]
ground_truth = "Fake"
explanation = "Subtle skin smoothing and edge blending indicate face-swap artifacts."
population_stat = "67% of users misclassified this."

[[items]]
ground_truth = "Fake"
explanation = "Detected blending anomalies and temporal inconsistencies."
population_stat = "71% spotted the anomaly."

[[items]]
ground_truth = "Real"
explanation = "Natural lighting and consistent edges without blending artifacts."
population_stat = "62% identified this correctly."
"#;
