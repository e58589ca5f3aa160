use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the MDTM FTP command: last modification time of a file, in UTC,
/// as `YYYYMMDDHHMMSS`.
pub async fn handle_mdtm_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "MDTM", &arg).await? {
        return Ok(());
    }

    let result = session.lock().await.vfs.modification_time(&arg).await;
    match result {
        Ok(modified) => {
            info!("Modification time for {} is {}", arg, modified);
            let response = format!("213 {}\r\n", modified.format("%Y%m%d%H%M%S"));
            send_response(&writer, response.as_bytes()).await
        }
        Err(e) => {
            error!("MDTM failed for {:?}: {}", arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
