use chrono::{DateTime, Local, Utc};
use filetime::FileTime;
use std::fs::Metadata;
use std::path::PathBuf;

/// A single item produced by [`VirtualFileSystem::list`](super::VirtualFileSystem::list).
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub virtual_path: String,
    pub real_path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
    pub created: Option<DateTime<Local>>,
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub nlink: u64,
    pub is_file: bool,
    pub is_dir: bool,
}

pub(crate) fn to_datetime(time: FileTime) -> DateTime<Utc> {
    DateTime::from_timestamp(time.unix_seconds(), time.nanoseconds()).unwrap_or_default()
}

impl DirectoryEntry {
    pub fn from_metadata(
        name: String,
        virtual_path: String,
        real_path: PathBuf,
        metadata: &Metadata,
    ) -> Self {
        let modified = to_datetime(FileTime::from_last_modification_time(metadata));
        let created = FileTime::from_creation_time(metadata).map(to_datetime);
        let (uid, gid, mode, nlink) = ownership(metadata);

        Self {
            name,
            virtual_path,
            real_path,
            size: metadata.len(),
            modified: modified.with_timezone(&Local),
            created: created.map(|c| c.with_timezone(&Local)),
            uid,
            gid,
            mode,
            nlink,
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
        }
    }

    /// `drwxr-xr-x` style permission column.
    pub fn permissions(&self) -> String {
        const BITS: [(u32, char); 9] = [
            (0o400, 'r'),
            (0o200, 'w'),
            (0o100, 'x'),
            (0o040, 'r'),
            (0o020, 'w'),
            (0o010, 'x'),
            (0o004, 'r'),
            (0o002, 'w'),
            (0o001, 'x'),
        ];
        let mut out = String::with_capacity(10);
        out.push(if self.is_dir { 'd' } else { '-' });
        for (bit, c) in BITS {
            out.push(if self.mode & bit != 0 { c } else { '-' });
        }
        out
    }

    /// One Unix-style listing line, CRLF terminated.
    pub fn to_list_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}\r\n",
            self.permissions(),
            self.nlink,
            self.uid,
            self.gid,
            self.size,
            self.modified.format("%b %d %H:%M"),
            self.name
        )
    }
}

/// Concatenates listing lines into the payload sent over the data connection.
pub fn format_listing(entries: &[DirectoryEntry]) -> String {
    entries.iter().map(DirectoryEntry::to_list_line).collect()
}

#[cfg(unix)]
fn ownership(metadata: &Metadata) -> (u32, u32, u32, u64) {
    use std::os::unix::fs::MetadataExt;
    (metadata.uid(), metadata.gid(), metadata.mode(), metadata.nlink())
}

#[cfg(not(unix))]
fn ownership(metadata: &Metadata) -> (u32, u32, u32, u64) {
    let mut mode = if metadata.is_dir() { 0o755 } else { 0o644 };
    if metadata.permissions().readonly() {
        mode &= !0o222;
    }
    (0, 0, mode, 1)
}
