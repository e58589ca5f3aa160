// src/constants.rs

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 2100;
pub const DEFAULT_TRANSFER_BUFFER_SIZE: usize = 64 * 1024;
pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_FEATURES: &[&str] = &["PORT", "UTF8", "SIZE", "MDTM", "REST STREAM"];

/// Environment variables consulted, in order, for the sandbox root.
pub const HOME_ENV_VARS: &[&str] = &["HOME", "USERPROFILE", "HOMEPATH"];

#[cfg(target_os = "windows")]
pub const DEFAULT_CONFIG_PATH: &str = "C:\\rouillevfsd\\etc\\rouillevfsd.conf";
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_CONFIG_PATH: &str = "/etc/rouillevfsd.conf";

/// Longest control line accepted, CRLF included. Longer lines drop the connection.
pub const MAX_COMMAND_LINE: usize = 4096;

/// Commands a client may pipeline ahead of the one being executed.
pub const COMMAND_QUEUE_DEPTH: usize = 32;
