use crate::config::{log_config, Config};
use crate::core_network::network;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration.
///
/// This function resolves the sandbox root and starts the FTP server,
/// logging significant steps and potential issues.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    let root = config.server.resolve_root().map_err(|e| {
        error!("Failed to resolve root directory: {:#}", e);
        e
    })?;

    info!("Starting server with config:");
    log_config(&config, &root);

    if let Err(e) = network::start_server(Arc::new(config), root).await {
        error!("Failed to start server: {:#}", e);
        return Err(e);
    }

    Ok(())
}
