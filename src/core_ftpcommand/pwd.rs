use crate::config::Config;
use crate::core_ftpcommand::utils::quote_path;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let current_dir = session.lock().await.vfs.current_virtual_path();
    let response = format!("257 {} is the current directory.\r\n", quote_path(&current_dir));
    send_response(&writer, response.as_bytes()).await
}
