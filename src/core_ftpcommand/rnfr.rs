use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RNFR (Rename From) FTP command.
///
/// This function records the file or directory to be renamed. The name is
/// only remembered until the next command, which must be RNTO.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The current name of the file or directory.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_rnfr_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "RNFR", &arg).await? {
        return Ok(());
    }

    let mut session = session.lock().await;
    if !session.vfs.exists(&arg).await {
        warn!("RNFR target does not exist: {}", arg);
        drop(session);
        return send_response(&writer, b"550 No such file or directory.\r\n").await;
    }

    info!("Rename started from: {}", arg);
    session.state.rename_from = Some(arg);
    drop(session);

    send_response(&writer, b"350 Ready for RNTO.\r\n").await
}
