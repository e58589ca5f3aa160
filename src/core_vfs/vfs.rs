use crate::core_vfs::entry::{to_datetime, DirectoryEntry};
use crate::core_vfs::error::VfsError;
use chrono::{DateTime, Utc};
use filetime::FileTime;
use log::{debug, warn};
use std::fs::Metadata;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncSeekExt;
use tokio::task::JoinSet;

/// A client path mapped onto the sandbox, already checked for containment.
#[derive(Debug, Clone)]
struct Resolved {
    segments: Vec<String>,
    real: PathBuf,
}

/// Sandboxes a real directory tree behind a virtual working directory.
///
/// Every client-supplied path goes through [`resolve`](Self::resolve): it is
/// normalized lexically against the cursor, joined onto `root`, and the
/// nearest existing ancestor is canonicalized and checked to still lie under
/// `root`. Traversal that would climb out of the root is rejected, never
/// clamped.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    root: PathBuf,
    cursor: Vec<String>,
}

fn virtual_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

impl VirtualFileSystem {
    /// `root` must already be canonical; see `ServerConfig::resolve_root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cursor: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_virtual_path(&self) -> String {
        virtual_path(&self.cursor)
    }

    /// Client-visible absolute form of `name`, resolved lexically.
    pub fn virtual_path_of(&self, name: &str) -> Result<String, VfsError> {
        self.normalize(name).map(|segments| virtual_path(&segments))
    }

    pub fn current_real_path(&self) -> PathBuf {
        self.real_path(&self.cursor)
    }

    fn real_path(&self, segments: &[String]) -> PathBuf {
        let mut real = self.root.clone();
        real.extend(segments);
        real
    }

    /// Moves the cursor back to `/`.
    pub fn reset(&mut self) {
        self.cursor.clear();
    }

    fn normalize(&self, name: &str) -> Result<Vec<String>, VfsError> {
        if name.is_empty() || name.contains('\0') {
            return Err(VfsError::InvalidPath(name.to_string()));
        }

        let mut segments = if name.starts_with(is_separator) {
            Vec::new()
        } else {
            self.cursor.clone()
        };

        for part in name.split(is_separator) {
            match part {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(VfsError::OutsideRoot(name.to_string()));
                    }
                }
                // Drive prefixes would make `join` discard the root.
                part if cfg!(windows) && part.contains(':') => {
                    return Err(VfsError::InvalidPath(name.to_string()));
                }
                part => segments.push(part.to_string()),
            }
        }
        Ok(segments)
    }

    async fn ensure_contained(&self, real: &Path, name: &str) -> Result<(), VfsError> {
        let mut probe = real.to_path_buf();
        loop {
            match fs::canonicalize(&probe).await {
                Ok(canonical) => {
                    return if canonical.starts_with(&self.root) {
                        Ok(())
                    } else {
                        warn!("Path escapes root: {:?} -> {:?}", real, canonical);
                        Err(VfsError::OutsideRoot(name.to_string()))
                    };
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // A dangling symlink would let a create follow it anywhere.
                    if fs::symlink_metadata(&probe).await.is_ok() {
                        warn!("Dangling symbolic link in path: {:?}", probe);
                        return Err(VfsError::OutsideRoot(name.to_string()));
                    }
                    if !probe.pop() {
                        return Err(VfsError::OutsideRoot(name.to_string()));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn contain(&self, segments: Vec<String>, name: &str) -> Result<Resolved, VfsError> {
        let real = self.real_path(&segments);
        self.ensure_contained(&real, name).await?;
        Ok(Resolved { segments, real })
    }

    async fn resolve(&self, name: &str) -> Result<Resolved, VfsError> {
        let segments = self.normalize(name)?;
        let resolved = self.contain(segments, name).await?;
        debug!("Resolved {:?} to {:?}", name, resolved.real);
        Ok(resolved)
    }

    async fn stat(real: &Path, name: &str) -> Result<Metadata, VfsError> {
        fs::metadata(real).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => VfsError::NotFound(name.to_string()),
            _ => VfsError::Io(e),
        })
    }

    async fn stat_file(&self, name: &str) -> Result<(Resolved, Metadata), VfsError> {
        let target = self.resolve(name).await?;
        let metadata = Self::stat(&target.real, name).await?;
        if !metadata.is_file() {
            return Err(VfsError::NotAFile(name.to_string()));
        }
        Ok((target, metadata))
    }

    pub async fn change_directory(&mut self, name: &str) -> Result<String, VfsError> {
        let target = match name {
            "." => return Ok(self.current_virtual_path()),
            ".." => {
                let mut segments = self.cursor.clone();
                segments.pop();
                self.contain(segments, name).await?
            }
            _ => {
                let target = self.resolve(name).await?;
                let metadata = Self::stat(&target.real, name).await?;
                if !metadata.is_dir() {
                    return Err(VfsError::NotADirectory(name.to_string()));
                }
                target
            }
        };

        self.cursor = target.segments;
        Ok(self.current_virtual_path())
    }

    /// Enumerates the directory behind the cursor. Entries are stat'd
    /// concurrently and come back in no particular order; entries that vanish
    /// or cannot be stat'd are skipped. A symbolic link is described by its
    /// target only when that target lies inside the root.
    pub async fn list(&self) -> Result<Vec<DirectoryEntry>, VfsError> {
        let here = self.contain(self.cursor.clone(), ".").await?;
        let mut reader = fs::read_dir(&here.real).await?;

        let mut stats = JoinSet::new();
        while let Some(dir_entry) = reader.next_entry().await? {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            let mut segments = here.segments.clone();
            segments.push(name.clone());
            let vpath = virtual_path(&segments);
            let real = dir_entry.path();
            let root = self.root.clone();

            stats.spawn(async move {
                let metadata = match fs::symlink_metadata(&real).await {
                    Ok(link) if link.file_type().is_symlink() => {
                        match fs::canonicalize(&real).await {
                            Ok(target) if target.starts_with(&root) => fs::metadata(&real).await,
                            _ => Ok(link),
                        }
                    }
                    other => other,
                };
                match metadata {
                    Ok(metadata) => Some(DirectoryEntry::from_metadata(name, vpath, real, &metadata)),
                    Err(e) => {
                        warn!("Failed to get metadata for entry: {:?}, error: {}", real, e);
                        None
                    }
                }
            });
        }

        let mut entries = Vec::with_capacity(stats.len());
        while let Some(joined) = stats.join_next().await {
            match joined {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!("Metadata task failed: {}", e),
            }
        }
        Ok(entries)
    }

    pub async fn make_directory(&self, name: &str) -> Result<PathBuf, VfsError> {
        let target = self.resolve(name).await?;
        if fs::symlink_metadata(&target.real).await.is_ok() {
            return Err(VfsError::AlreadyExists(name.to_string()));
        }
        fs::create_dir(&target.real).await?;
        Ok(target.real)
    }

    pub async fn remove_directory(&self, name: &str) -> Result<(), VfsError> {
        let target = self.resolve(name).await?;
        if target.segments.is_empty() {
            return Err(VfsError::InvalidPath(name.to_string()));
        }
        let metadata = Self::stat(&target.real, name).await?;
        if !metadata.is_dir() {
            return Err(VfsError::NotADirectory(name.to_string()));
        }
        fs::remove_dir(&target.real).await?;
        Ok(())
    }

    pub async fn remove_file(&self, name: &str) -> Result<(), VfsError> {
        let (target, _) = self.stat_file(name).await?;
        fs::remove_file(&target.real).await?;
        Ok(())
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), VfsError> {
        let source = self.resolve(from).await?;
        let target = self.resolve(to).await?;
        if source.segments.is_empty() || target.segments.is_empty() {
            return Err(VfsError::InvalidPath(from.to_string()));
        }
        if fs::symlink_metadata(&source.real).await.is_err() {
            return Err(VfsError::SourceMissing(from.to_string()));
        }
        if fs::symlink_metadata(&target.real).await.is_ok() {
            return Err(VfsError::TargetExists(to.to_string()));
        }
        fs::rename(&source.real, &target.real).await?;
        Ok(())
    }

    pub async fn modification_time(&self, name: &str) -> Result<DateTime<Utc>, VfsError> {
        let (_, metadata) = self.stat_file(name).await?;
        Ok(to_datetime(FileTime::from_last_modification_time(&metadata)))
    }

    pub async fn size(&self, name: &str) -> Result<u64, VfsError> {
        let (_, metadata) = self.stat_file(name).await?;
        Ok(metadata.len())
    }

    /// Escaping or malformed paths simply do not exist.
    pub async fn exists(&self, name: &str) -> bool {
        match self.resolve(name).await {
            Ok(target) => fs::metadata(&target.real).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Opens a file for download, positioned at `offset`.
    pub async fn open_for_read(&self, name: &str, offset: u64) -> Result<File, VfsError> {
        let (target, _) = self.stat_file(name).await?;
        let mut file = File::open(&target.real).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(file)
    }

    /// Opens (creating if absent) a file for upload; truncates unless `append`.
    pub async fn open_for_write(&self, name: &str, append: bool) -> Result<File, VfsError> {
        let target = self.resolve(name).await?;
        match fs::metadata(&target.real).await {
            Ok(metadata) if !metadata.is_file() => {
                return Err(VfsError::NotAFile(name.to_string()))
            }
            _ => {}
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        Ok(options.open(&target.real).await?)
    }
}
