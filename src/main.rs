mod config;
mod constants;
mod core_cli;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod core_transfer;
mod core_vfs;
mod helpers;
mod server;
mod session;

use crate::config::Config;
use crate::core_cli::Cli;
use crate::core_log::logger::init_logger;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, then let the CLI override it
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
