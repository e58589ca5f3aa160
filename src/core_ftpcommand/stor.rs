use crate::config::Config;
use crate::core_ftpcommand::data_connection::{
    open_data_connection, require_data_endpoint, run_transfer, Payload,
};
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Receives a file from the client over a new data connection, truncating
/// the target or appending to it.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The name of the file to be stored.
/// * `append` - Whether to append (APPE) instead of truncating (STOR).
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
async fn receive_file(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
    append: bool,
) -> Result<(), std::io::Error> {
    let verb = if append { "APPE" } else { "STOR" };
    let Some(endpoint) = require_data_endpoint(&writer, &session).await? else {
        return Ok(());
    };
    if !ensure_argument(&writer, verb, &arg).await? {
        return Ok(());
    }
    info!("Received {} command with argument: {}", verb, arg);

    // Nothing is truncated before the data connection is up; STOR empties
    // the file through a second handle at that point.
    let (opened, existed) = {
        let session = session.lock().await;
        let existed = session.vfs.exists(&arg).await;
        (session.vfs.open_for_write(&arg, true).await, existed)
    };
    let file = match opened {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open {:?} for writing: {}", arg, e);
            return send_response(&writer, e.to_ftp_response().as_bytes()).await;
        }
    };
    let truncate = if append {
        None
    } else {
        match file.try_clone().await {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to duplicate handle for {:?}: {}", arg, e);
                return send_response(&writer, b"550 Requested action not taken.\r\n").await;
            }
        }
    };

    let sink = Payload::Inbound {
        sink: Box::new(file),
        truncate,
    };
    let connection = open_data_connection(&writer, &session, &config, endpoint, sink).await?;
    match connection {
        Some(transfer) => {
            run_transfer(&writer, &session, transfer, b"226 Transfer complete.\r\n").await?;
        }
        None if !existed => {
            if let Err(e) = session.lock().await.vfs.remove_file(&arg).await {
                warn!("Failed to remove unused upload target {:?}: {}", arg, e);
            }
        }
        None => {}
    }
    Ok(())
}

/// Handles the STOR (Store File) FTP command.
pub async fn handle_stor_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    receive_file(writer, config, session, arg, false).await
}

/// Handles the APPE (Append) FTP command.
pub async fn handle_appe_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    receive_file(writer, config, session, arg, true).await
}
