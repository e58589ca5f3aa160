use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// This function sets the username for the session and requests the password
/// from the client. Any username is accepted.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - A shared, locked session containing the user's current state.
/// * `username` - The username provided by the client.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_user_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> Result<(), std::io::Error> {
    info!("Received USER command with username: {}", username);

    {
        let mut session = session.lock().await;
        session.state.username = Some(username);
    }

    send_response(&writer, b"331 User name okay, need password.\r\n").await
}
