//! Hash cache store
//!
//! Provides the lookup tables the engine consults before touching file
//! content. Records carry the metadata (mtime, size) they were computed
//! against; validity is decided by the engine, not the store.

pub mod memory;

pub use memory::MemoryCache;

use crate::tree::manifest::FileHashEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cached digest of a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCacheRecord {
    pub hash: String,
    pub modified: SystemTime,
    pub size: u64,
}

impl FileCacheRecord {
    /// A record is reusable iff both mtime and size still match
    pub fn is_fresh(&self, modified: SystemTime, size: u64) -> bool {
        self.modified == modified && self.size == size
    }
}

/// Metadata of one path that contributed to a directory hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStamp {
    pub path: PathBuf,
    pub modified: SystemTime,
    /// `None` for directories
    pub size: Option<u64>,
}

/// Cached aggregate digest of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirCacheRecord {
    pub hash: String,
    /// The directory's own mtime when the hash was computed
    pub modified: SystemTime,
    pub contents: Vec<FileHashEntry>,
    pub include_subdirectories: bool,
    /// Every file and subdirectory that fed the hash, transitively
    pub stamps: Vec<ContentStamp>,
}

/// Entry counts and hit/miss tallies for a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub file_entries: usize,
    pub dir_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Cache interface
///
/// Implementations must be cheap to call from async code: no method may
/// block on I/O.
pub trait HashCache: Send + Sync {
    fn get_file(&self, path: &Path) -> Option<FileCacheRecord>;
    fn put_file(&self, path: PathBuf, record: FileCacheRecord);
    fn remove_file(&self, path: &Path) -> Option<FileCacheRecord>;

    fn get_dir(&self, path: &Path) -> Option<DirCacheRecord>;
    fn put_dir(&self, path: PathBuf, record: DirCacheRecord);
    fn remove_dir(&self, path: &Path) -> Option<DirCacheRecord>;

    fn clear(&self);
    fn stats(&self) -> CacheStats;
}
