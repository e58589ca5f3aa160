pub mod error;
pub mod transfer;

pub use error::TransferError;
pub use transfer::{Transfer, TransferHandle, TransferOptions, TransferReport, TransferState};
