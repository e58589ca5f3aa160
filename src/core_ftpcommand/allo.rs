use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the ALLO FTP command. Files grow on demand, so there is nothing
/// to reserve.
pub async fn handle_allo_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    info!("Received ALLO command with argument: {}", arg);
    send_response(&writer, b"202 No storage allocation necessary.\r\n").await
}
