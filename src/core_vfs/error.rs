// Error handling for the virtual filesystem
use std::io::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("File exists: {0}")]
    AlreadyExists(String),

    #[error("Source path does not exist: {0}")]
    SourceMissing(String),

    #[error("Target path already exists: {0}")]
    TargetExists(String),

    #[error("Path is outside of the allowed area: {0}")]
    OutsideRoot(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VfsError {
    /// Human-readable cause that never leaks the real filesystem layout.
    pub fn cause(&self) -> String {
        match self {
            VfsError::Io(e) => match e.kind() {
                ErrorKind::NotFound => "No such file or directory".to_string(),
                ErrorKind::PermissionDenied => "Permission denied".to_string(),
                ErrorKind::AlreadyExists => "File exists".to_string(),
                _ => "Requested action not taken".to_string(),
            },
            other => other.to_string(),
        }
    }

    pub fn to_ftp_response(&self) -> String {
        format!("550 {}.\r\n", self.cause())
    }
}
