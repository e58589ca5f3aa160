// Error handling for data connections
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Cannot open data connection to {0}: {1}")]
    Connect(SocketAddr, #[source] std::io::Error),

    #[error("Timed out opening data connection to {0}")]
    ConnectTimedOut(SocketAddr),

    #[error("Data transfer failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data connection idle for more than {0:?}")]
    TimedOut(Duration),
}

impl TransferError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            TransferError::Connect(..) | TransferError::ConnectTimedOut(_) => {
                "425 Can't open data connection.\r\n".to_string()
            }
            TransferError::TimedOut(_) => {
                "550 Requested action aborted. Data connection timed out.\r\n".to_string()
            }
            TransferError::Io(_) => {
                "550 Requested action aborted. Data transfer failed.\r\n".to_string()
            }
        }
    }
}
