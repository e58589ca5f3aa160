use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the DELE (Delete File) FTP command.
///
/// Directories are refused; use RMD for those.
pub async fn handle_dele_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "DELE", &arg).await? {
        return Ok(());
    }

    let result = session.lock().await.vfs.remove_file(&arg).await;
    match result {
        Ok(()) => {
            info!("File deleted: {}", arg);
            send_response(&writer, b"250 File deleted.\r\n").await
        }
        Err(e) => {
            error!("Failed to delete file {:?}: {}", arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
