// core_ftpcommand/size.rs

use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SIZE (File Size) FTP command.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The name of the file to retrieve its size.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_size_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "SIZE", &arg).await? {
        return Ok(());
    }

    let result = session.lock().await.vfs.size(&arg).await;
    match result {
        Ok(file_size) => {
            info!("File size for {} is {}", arg, file_size);
            send_response(&writer, format!("213 {}\r\n", file_size).as_bytes()).await
        }
        Err(e) => {
            error!("SIZE failed for {:?}: {}", arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
