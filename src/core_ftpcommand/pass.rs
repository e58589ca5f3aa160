use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command. There is no credential store: any password
/// is accepted once USER has been sent.
pub async fn handle_pass_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _password: String,
) -> Result<(), std::io::Error> {
    let username = session.lock().await.state.username.clone();

    match username {
        Some(username) => {
            info!("User logged in: {}", username);
            send_response(&writer, b"230 User logged in, proceed.\r\n").await
        }
        None => {
            warn!("PASS received before USER");
            send_response(&writer, b"503 Bad sequence of commands, send USER first.\r\n").await
        }
    }
}
