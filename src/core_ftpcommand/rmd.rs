use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_rmd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "RMD", &arg).await? {
        return Ok(());
    }

    let result = session.lock().await.vfs.remove_directory(&arg).await;
    match result {
        Ok(()) => {
            info!("Directory removed: {}", arg);
            send_response(&writer, b"250 Directory removed.\r\n").await
        }
        Err(e) => {
            error!("Failed to remove directory {:?}: {}", arg, e);
            send_response(&writer, e.to_ftp_response().as_bytes()).await
        }
    }
}
