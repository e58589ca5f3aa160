use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command.
///
/// This function sends a response indicating the service is closing the
/// control connection; the connection loop closes it afterwards.
pub async fn handle_quit_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("Received QUIT command. Closing connection.");
    session.lock().await.abort_transfer();
    send_response(&writer, b"221 Service closing control connection.\r\n").await
}
