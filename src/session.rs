use crate::core_transfer::TransferHandle;
use crate::core_vfs::VirtualFileSystem;
use log::{debug, info};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Utf8,
}

impl Encoding {
    /// Encodes text sent over a data connection. In ASCII mode anything
    /// outside 7-bit ASCII is replaced by `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationType {
    Ascii, // TYPE A
    Image, // TYPE I
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Stream, // MODE S, the only mode supported
}

/// Protocol parameters of a control connection. Replaced wholesale by
/// [`Session::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub username: Option<String>,
    pub encoding: Encoding,
    pub representation: RepresentationType,
    pub mode: TransferMode,
    pub data_endpoint: Option<SocketAddr>,
    pub rename_from: Option<String>,
    pub restart_offset: u64,
}

impl SessionState {
    pub const DEFAULT: SessionState = SessionState {
        username: None,
        encoding: Encoding::Ascii,
        representation: RepresentationType::Ascii,
        mode: TransferMode::Stream,
        data_endpoint: None,
        rename_from: None,
        restart_offset: 0,
    };
}

impl Default for SessionState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug)]
pub struct Session {
    pub state: SessionState,
    pub vfs: VirtualFileSystem,
    pub active_transfer: Option<TransferHandle>,
}

impl Session {
    pub fn new(base_path: PathBuf) -> Self {
        let vfs = VirtualFileSystem::new(base_path);
        debug!("New session rooted at {:?}", vfs.root());
        Self {
            state: SessionState::DEFAULT,
            vfs,
            active_transfer: None,
        }
    }

    /// Back to the state of a freshly accepted connection: parameters reset,
    /// cursor at `/`, any transfer still registered is aborted.
    pub fn reset(&mut self) {
        if let Some(transfer) = self.active_transfer.take() {
            transfer.abort();
        }
        self.state = SessionState::DEFAULT;
        self.vfs.reset();
        info!("Session reset to defaults");
    }

    /// Aborts the active transfer, if any. Returns whether one was present.
    pub fn abort_transfer(&mut self) -> bool {
        match self.active_transfer.take() {
            Some(transfer) => {
                transfer.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels the active transfer but leaves it registered, so the command
    /// that started it still observes the Aborted outcome. Returns whether a
    /// running transfer was interrupted.
    pub fn interrupt_transfer(&self) -> bool {
        match &self.active_transfer {
            Some(transfer) if !transfer.state().is_terminal() => {
                transfer.abort();
                true
            }
            _ => false,
        }
    }
}
