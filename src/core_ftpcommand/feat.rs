use crate::config::Config;
use crate::helpers::{send_multiline, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the FEAT (Feature) FTP command.
///
/// Responds with the server-wide feature list from the configuration.
pub async fn handle_feat_command(
    writer: ControlWriter,
    config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("Responding to FEAT command with supported features.");
    send_multiline(&writer, 211, "Features", &config.server.features, "Features end").await
}
