use crate::config::Config;
use crate::core_transfer::{Transfer, TransferOptions, TransferState};
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;

/// Local end of a transfer.
pub enum Payload {
    /// Bytes read from here are sent to the client (LIST, RETR).
    Outbound(Box<dyn AsyncRead + Send + Unpin>),
    /// Bytes from the client are written here (STOR, APPE). `truncate` is
    /// emptied only once the data connection is up, so a failed connect
    /// leaves an existing file untouched.
    Inbound {
        sink: Box<dyn AsyncWrite + Send + Unpin>,
        truncate: Option<File>,
    },
}

/// Returns the endpoint set by PORT, or replies 503 when there is none.
pub async fn require_data_endpoint(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<Option<SocketAddr>, std::io::Error> {
    let endpoint = session.lock().await.state.data_endpoint;
    if endpoint.is_none() {
        warn!("Data command received before PORT");
        send_response(writer, b"503 Bad sequence of commands, send PORT first.\r\n").await?;
    }
    Ok(endpoint)
}

/// Connects to the client's data port and acknowledges with 150, or replies
/// 425 and returns `None` when the connection cannot be opened. The transfer
/// is registered on the session before the 150 goes out, so an ABOR sent in
/// response to it always finds it.
pub async fn open_data_connection(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    config: &Config,
    endpoint: SocketAddr,
    payload: Payload,
) -> Result<Option<Transfer>, std::io::Error> {
    let options = TransferOptions::from_config(&config.server);
    let (result, truncate) = match payload {
        Payload::Outbound(source) => (
            Transfer::create_outbound_send(endpoint, source, options).await,
            None,
        ),
        Payload::Inbound { sink, truncate } => (
            Transfer::create_outbound_receive(endpoint, sink, options).await,
            truncate,
        ),
    };

    match result {
        Ok(transfer) => {
            if let Some(file) = truncate {
                if let Err(e) = file.set_len(0).await {
                    error!("Failed to truncate upload target: {}", e);
                    send_response(writer, b"550 Requested action not taken.\r\n").await?;
                    return Ok(None);
                }
            }
            debug!("Data connection to {} ready ({:?})", endpoint, transfer.state());
            session.lock().await.active_transfer = Some(transfer.handle());
            send_response(writer, b"150 Opening data connection.\r\n").await?;
            Ok(Some(transfer))
        }
        Err(e) => {
            warn!("{}", e);
            send_response(writer, e.to_ftp_response().as_bytes()).await?;
            Ok(None)
        }
    }
}

/// Runs `transfer` to completion, unregisters it, then reports the outcome on
/// the control connection.
pub async fn run_transfer(
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    transfer: Transfer,
    completed: &[u8],
) -> Result<TransferState, std::io::Error> {
    let report = transfer.run().await;
    session.lock().await.active_transfer = None;

    match report.state {
        TransferState::Completed => {
            info!("Transfer complete: {} bytes", report.bytes);
            send_response(writer, completed).await?;
        }
        TransferState::Aborted => {
            send_response(writer, b"426 Connection closed; transfer aborted.\r\n").await?;
        }
        _ => {
            let message = report
                .error
                .map(|e| e.to_ftp_response())
                .unwrap_or_else(|| "550 Requested action aborted.\r\n".to_string());
            send_response(writer, message.as_bytes()).await?;
        }
    }
    Ok(report.state)
}
