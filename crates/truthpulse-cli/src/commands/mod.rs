pub mod export;
pub mod init;
pub mod metrics;
pub mod scan;
pub mod score;
pub mod serve;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use truthpulse_server::config::load_config_from;
use truthpulse_server::TruthpulseConfig;

/// Load the config and apply the `--data-dir` override.
pub fn load_config(config: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<TruthpulseConfig> {
    let mut config = load_config_from(config.as_deref())?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}
