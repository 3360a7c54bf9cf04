//! The `truthpulse serve` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(
    config: Option<PathBuf>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    seed_endpoint: bool,
) -> Result<()> {
    let mut config = super::load_config(config, data_dir)?;
    if let Some(port) = port {
        config.port = port;
    }
    if seed_endpoint {
        config.enable_seed = true;
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        require_contact = config.require_contact,
        enable_seed = config.enable_seed,
        "starting server"
    );
    truthpulse_server::serve(config).await
}
