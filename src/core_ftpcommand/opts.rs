use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::{Encoding, Session};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the OPTS FTP command. Only `UTF8 ON` / `UTF8 OFF` are understood.
pub async fn handle_opts_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let option = arg.trim().to_ascii_uppercase();
    let encoding = match option.split_whitespace().collect::<Vec<_>>().as_slice() {
        [] => {
            send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
            return Ok(());
        }
        ["UTF8"] | ["UTF8", "ON"] => Encoding::Utf8,
        ["UTF8", "OFF"] => Encoding::Ascii,
        _ => {
            warn!("Unsupported OPTS argument: {}", arg);
            send_response(&writer, b"504 Option not supported.\r\n").await?;
            return Ok(());
        }
    };

    session.lock().await.state.encoding = encoding;
    info!("Encoding set to {:?}", encoding);
    let response: &[u8] = match encoding {
        Encoding::Utf8 => b"200 UTF8 enabled.\r\n",
        Encoding::Ascii => b"200 UTF8 disabled.\r\n",
    };
    send_response(&writer, response).await
}
