use crate::config::Config;
use crate::core_ftpcommand::data_connection::{
    open_data_connection, require_data_endpoint, run_transfer, Payload,
};
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command.
///
/// This function sends a file to the client over a new data connection,
/// starting at the offset set by a preceding REST. The offset is consumed by
/// this command whether or not the download starts.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_retr_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let Some(endpoint) = require_data_endpoint(&writer, &session).await? else {
        return Ok(());
    };
    if !ensure_argument(&writer, "RETR", &arg).await? {
        return Ok(());
    }

    let opened = {
        let mut session = session.lock().await;
        let offset = std::mem::take(&mut session.state.restart_offset);
        info!("Sending file {} from offset {}", arg, offset);
        session.vfs.open_for_read(&arg, offset).await
    };

    let file = match opened {
        Ok(file) => file,
        Err(e) => {
            error!("File not found or could not be opened: {:?}, error: {}", arg, e);
            return send_response(&writer, e.to_ftp_response().as_bytes()).await;
        }
    };

    let source = Payload::Outbound(Box::new(file));
    let connection = open_data_connection(&writer, &session, &config, endpoint, source).await?;
    if let Some(transfer) = connection {
        run_transfer(&writer, &session, transfer, b"226 Transfer complete.\r\n").await?;
    }
    Ok(())
}
