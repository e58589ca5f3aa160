use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::{Session, TransferMode};
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MODE FTP command. Stream mode is the only one available.
pub async fn handle_mode_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    match arg.trim().to_ascii_uppercase().as_str() {
        "" => send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await,
        "S" => {
            session.lock().await.state.mode = TransferMode::Stream;
            send_response(&writer, b"200 Mode set to S.\r\n").await
        }
        other => {
            warn!("Unsupported MODE requested: {}", other);
            let response = format!("504 Mode {} not supported.\r\n", other);
            send_response(&writer, response.as_bytes()).await
        }
    }
}
