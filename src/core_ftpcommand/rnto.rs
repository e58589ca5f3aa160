use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RNTO (Rename To) FTP command.
///
/// Completes a rename started by RNFR. The pending source is consumed
/// whatever the outcome.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The new name of the file or directory.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_rnto_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut session = session.lock().await;
    let Some(from) = session.state.rename_from.take() else {
        drop(session);
        warn!("RNTO received without RNFR");
        return send_response(&writer, b"503 Bad sequence of commands, send RNFR first.\r\n").await;
    };

    if !ensure_argument(&writer, "RNTO", &arg).await? {
        return Ok(());
    }

    let result = session.vfs.rename(&from, &arg).await;
    drop(session);

    match result {
        Ok(()) => {
            info!("Renamed {} to {}", from, arg);
            send_response(&writer, b"250 Rename successful.\r\n").await
        }
        Err(e) => {
            error!("Failed to rename {} to {}: {}", from, arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
