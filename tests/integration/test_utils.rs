//! Filesystem adapters and fixtures shared by the integration tests

use async_trait::async_trait;
use portal_hash::tree::walker::{DirEntryInfo, FileStamp, Filesystem, LocalFilesystem};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tokio::io::AsyncRead;

/// Local filesystem that counts how often file content is opened
#[derive(Default)]
pub struct CountingFilesystem {
    opens: AtomicUsize,
}

impl CountingFilesystem {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Filesystem for CountingFilesystem {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        LocalFilesystem.read_dir(dir).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        LocalFilesystem.stat(path).await
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Send + Unpin>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        LocalFilesystem.open(path).await
    }
}

/// Local filesystem whose listings come back sorted by name, then reversed
pub struct ReversedListing;

#[async_trait]
impl Filesystem for ReversedListing {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = LocalFilesystem.read_dir(dir).await?;
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        LocalFilesystem.stat(path).await
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Send + Unpin>> {
        LocalFilesystem.open(path).await
    }
}

/// Local filesystem whose listings come back sorted by name
pub struct SortedListing;

#[async_trait]
impl Filesystem for SortedListing {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = LocalFilesystem.read_dir(dir).await?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        LocalFilesystem.stat(path).await
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Send + Unpin>> {
        LocalFilesystem.open(path).await
    }
}

/// Write `content` and pin the mtime so consecutive writes never share one
pub fn write_with_mtime(path: &Path, content: &str, secs_after_epoch: u64) {
    fs::write(path, content).unwrap();
    set_mtime(path, secs_after_epoch);
}

pub fn set_mtime(path: &Path, secs_after_epoch: u64) {
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch);
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(time)).unwrap();
}
