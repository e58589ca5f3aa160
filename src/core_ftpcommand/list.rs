use crate::config::Config;
use crate::core_ftpcommand::data_connection::{
    open_data_connection, require_data_endpoint, run_transfer, Payload,
};
use crate::core_vfs::format_listing;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the LIST FTP command.
///
/// Lists the session's working directory in Unix `ls -l` style and sends it
/// over a fresh data connection. Arguments (`-a`, `-l`, ...) are ignored.
pub async fn handle_list_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let Some(endpoint) = require_data_endpoint(&writer, &session).await? else {
        return Ok(());
    };

    let (listing, encoding) = {
        let session = session.lock().await;
        (session.vfs.list().await, session.state.encoding)
    };

    let entries = match listing {
        Ok(entries) => entries,
        Err(e) => {
            error!("Error reading directory: {}", e);
            return send_response(&writer, e.to_ftp_response().as_bytes()).await;
        }
    };
    info!("Listing {} entries", entries.len());

    let payload = encoding.encode(&format_listing(&entries));
    let source = Payload::Outbound(Box::new(Cursor::new(payload)));
    let connection = open_data_connection(&writer, &session, &config, endpoint, source).await?;
    if let Some(transfer) = connection {
        run_transfer(&writer, &session, transfer, b"250 Closing data connection.\r\n").await?;
    }
    Ok(())
}
