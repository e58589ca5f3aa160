use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the ABOR FTP command.
///
/// The connection reader already interrupts a running transfer as soon as
/// ABOR arrives; this handler runs in queue order and only has to clean up
/// and acknowledge.
pub async fn handle_abor_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    if session.lock().await.abort_transfer() {
        info!("Active transfer aborted.");
        send_response(&writer, b"226 Transfer aborted.\r\n").await
    } else {
        send_response(&writer, b"226 No transfer in progress.\r\n").await
    }
}
