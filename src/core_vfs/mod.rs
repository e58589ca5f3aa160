pub mod entry;
pub mod error;
pub mod vfs;

pub use entry::{format_listing, DirectoryEntry};
pub use error::VfsError;
pub use vfs::VirtualFileSystem;
