use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the REST FTP command: the next RETR starts at this byte offset.
pub async fn handle_rest_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let offset = match arg.trim().parse::<u64>() {
        Ok(offset) => offset,
        Err(_) => {
            warn!("Invalid REST offset: {}", arg);
            return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
        }
    };

    session.lock().await.state.restart_offset = offset;
    info!("Restart offset set to {}", offset);
    let response = format!(
        "350 Restarting at {}. Send RETR to initiate transfer.\r\n",
        offset
    );
    send_response(&writer, response.as_bytes()).await
}
