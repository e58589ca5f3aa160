use crate::config::Config;
use crate::core_ftpcommand::utils::{ensure_argument, quote_path};
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MKD (Make Directory) FTP command.
///
/// This function creates a new directory relative to the session's virtual
/// working directory (or at an absolute virtual path). Containment in the
/// sandbox root is enforced by the virtual filesystem.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The directory name to create.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_mkd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "MKD", &arg).await? {
        return Ok(());
    }
    info!("Received MKD command with argument: {}", arg);

    let result = {
        let session = session.lock().await;
        session.vfs.make_directory(&arg).await.and_then(|real_path| {
            let created = session.vfs.virtual_path_of(&arg)?;
            Ok((real_path, created))
        })
    };
    match result {
        Ok((real_path, created)) => {
            info!("Directory created successfully: {:?}", real_path);
            let response = format!("257 {} directory created.\r\n", quote_path(&created));
            send_response(&writer, response.as_bytes()).await
        }
        Err(e) => {
            error!("Failed to create directory {:?}: {}", arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
