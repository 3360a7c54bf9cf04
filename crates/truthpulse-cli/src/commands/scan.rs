//! The `truthpulse scan` command.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;

use truthpulse_core::scan::{start_scan, ScanConfig};

pub async fn execute(seed: Option<u64>, tick_ms: u64) -> Result<()> {
    let handle = start_scan(ScanConfig {
        tick: Duration::from_millis(tick_ms.max(1)),
        seed,
        ..Default::default()
    });

    let mut progress = handle.progress();
    let mut stderr = std::io::stderr();
    while progress.changed().await.is_ok() {
        let percent = *progress.borrow_and_update();
        write!(stderr, "\rScanning... {percent:>3}%")?;
        stderr.flush()?;
        if percent >= 100 {
            break;
        }
    }
    writeln!(stderr)?;

    let result = handle
        .finish()
        .await
        .ok_or_else(|| anyhow::anyhow!("scan was cancelled"))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
