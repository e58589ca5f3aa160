use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::{RepresentationType, Session};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the TYPE FTP command.
///
/// ASCII (`A`, optionally `A N`) and Image (`I`, or its synonym `L 8`) are
/// supported. EBCDIC and other byte sizes are refused with 504.
///
/// # Arguments
///
/// * `writer` - The shared control connection for writing responses to the client.
/// * `_config` - A shared server configuration.
/// * `session` - A shared, locked session containing the user's current state.
/// * `arg` - The argument specifying the transfer type.
///
/// # Returns
///
/// Result<(), std::io::Error> indicating the success or failure of the operation.
pub async fn handle_type_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let upper = arg.to_uppercase();
    let parts: Vec<&str> = upper.split_whitespace().collect();

    let representation = match parts.as_slice() {
        [] => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(());
        }
        ["A"] | ["A", "N"] => RepresentationType::Ascii,
        ["I"] | ["L", "8"] => RepresentationType::Image,
        _ => {
            warn!("Unsupported TYPE requested: {}", arg);
            let response = format!("504 Type {} not supported.\r\n", arg.trim());
            send_response(&writer, response.as_bytes()).await?;
            return Ok(());
        }
    };

    session.lock().await.state.representation = representation;
    info!("Transfer type set to {:?}", representation);

    let response: &[u8] = match representation {
        RepresentationType::Ascii => b"200 Type set to A.\r\n",
        RepresentationType::Image => b"200 Type set to I.\r\n",
    };
    send_response(&writer, response).await
}
