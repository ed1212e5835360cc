//! Filesystem enumeration used by the hash engine
//!
//! The engine never touches `std::fs` or `tokio::fs` directly; it goes through
//! the [`Filesystem`] trait so listings and I/O can be substituted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tokio::io::AsyncRead;

/// Entry kinds the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Kind of a raw directory entry, including the ones the engine skips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Other,
}

impl NodeKind {
    fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            NodeKind::File
        } else if file_type.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::Other
        }
    }
}

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// Base name of the entry
    pub name: String,
    /// Kind as reported by the directory entry (symlinks are not followed)
    pub kind: NodeKind,
}

/// Result of a single stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub size: u64,
    pub kind: NodeKind,
}

impl FileStamp {
    pub fn from_metadata(metadata: &std::fs::Metadata) -> io::Result<Self> {
        Ok(Self {
            modified: metadata.modified()?,
            size: metadata.len(),
            kind: NodeKind::from_file_type(metadata.file_type()),
        })
    }
}

/// File-system enumeration interface consumed by the engine
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// List immediate entries of `dir` in the order the backend yields them
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Stat `path`, following symlinks
    async fn stat(&self, path: &Path) -> io::Result<FileStamp>;

    /// Open `path` for streaming reads
    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Send + Unpin>>;
}

/// Local filesystem backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut reader = tokio::fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: NodeKind::from_file_type(file_type),
            });
        }
        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        let metadata = tokio::fs::metadata(path).await?;
        FileStamp::from_metadata(&metadata)
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Send + Unpin>> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }
}
