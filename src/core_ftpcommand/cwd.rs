use crate::config::Config;
use crate::core_ftpcommand::utils::ensure_argument;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Changes the session's virtual working directory to `target` and reports
/// the outcome. Shared by CWD and CDUP.
pub async fn change_directory(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    target: &str,
) -> Result<(), std::io::Error> {
    let result = {
        let mut session = session.lock().await;
        let result = session.vfs.change_directory(target).await;
        debug!("Real working directory: {:?}", session.vfs.current_real_path());
        result
    };

    match result {
        Ok(current_dir) => {
            info!("Directory successfully changed to: {}", current_dir);
            let response = format!("250 Directory successfully changed to \"{}\".\r\n", current_dir);
            send_response(writer, response.as_bytes()).await
        }
        Err(e) => {
            warn!("Failed to change directory to {:?}: {}", target, e);
            send_response(writer, e.to_ftp_response().as_bytes()).await
        }
    }
}

pub async fn handle_cwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if !ensure_argument(&writer, "CWD", &arg).await? {
        return Ok(());
    }
    info!("Received CWD command with argument: {}", arg);
    change_directory(&writer, &session, &arg).await
}
