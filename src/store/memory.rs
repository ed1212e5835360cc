//! In-memory hash cache with optional capacity and TTL bounds

use super::{CacheStats, DirCacheRecord, FileCacheRecord, HashCache};
use crate::config::CacheConfig;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

struct Timed<V> {
    inserted: Instant,
    value: V,
}

struct Table<V> {
    entries: LruCache<PathBuf, Timed<V>>,
}

impl<V: Clone> Table<V> {
    fn new(capacity: Option<NonZeroUsize>) -> Self {
        let entries = match capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self { entries }
    }

    /// Returns the value and whether an expired entry was dropped
    fn get(&mut self, path: &Path, ttl: Option<Duration>) -> (Option<V>, bool) {
        let key = path.to_path_buf();
        let expired = match (self.entries.peek(&key), ttl) {
            (Some(timed), Some(ttl)) => timed.inserted.elapsed() > ttl,
            _ => false,
        };
        if expired {
            self.entries.pop(&key);
            return (None, true);
        }
        (self.entries.get(&key).map(|t| t.value.clone()), false)
    }

    /// Returns true when inserting pushed out a different entry
    fn put(&mut self, path: PathBuf, value: V) -> bool {
        let timed = Timed {
            inserted: Instant::now(),
            value,
        };
        match self.entries.push(path.clone(), timed) {
            Some((old_key, _)) => old_key != path,
            None => false,
        }
    }

    fn remove(&mut self, path: &Path) -> Option<V> {
        self.entries.pop(&path.to_path_buf()).map(|t| t.value)
    }
}

struct Inner {
    files: Table<FileCacheRecord>,
    dirs: Table<DirCacheRecord>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Inner {
    fn record_lookup(&mut self, found: bool, expired: bool) {
        if found {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        if expired {
            self.evictions += 1;
        }
    }
}

/// Process-lifetime cache held entirely in memory
///
/// Unbounded and without expiry by default, which matches a cache that
/// lives only as long as one launcher session. `capacity` bounds each of the
/// file and directory tables independently (least recently used entries go
/// first); `ttl` makes entries older than the given age invisible.
pub struct MemoryCache {
    inner: Mutex<Inner>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Unbounded cache without expiry
    pub fn new() -> Self {
        Self::with_limits(None, None)
    }

    pub fn with_limits(capacity: Option<NonZeroUsize>, ttl: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                files: Table::new(capacity),
                dirs: Table::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_limits(
            config.capacity.and_then(NonZeroUsize::new),
            config.ttl_secs.map(Duration::from_secs),
        )
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HashCache for MemoryCache {
    fn get_file(&self, path: &Path) -> Option<FileCacheRecord> {
        let mut inner = self.inner.lock();
        let (value, expired) = inner.files.get(path, self.ttl);
        inner.record_lookup(value.is_some(), expired);
        value
    }

    fn put_file(&self, path: PathBuf, record: FileCacheRecord) {
        let mut inner = self.inner.lock();
        if inner.files.put(path, record) {
            inner.evictions += 1;
        }
    }

    fn remove_file(&self, path: &Path) -> Option<FileCacheRecord> {
        self.inner.lock().files.remove(path)
    }

    fn get_dir(&self, path: &Path) -> Option<DirCacheRecord> {
        let mut inner = self.inner.lock();
        let (value, expired) = inner.dirs.get(path, self.ttl);
        inner.record_lookup(value.is_some(), expired);
        value
    }

    fn put_dir(&self, path: PathBuf, record: DirCacheRecord) {
        let mut inner = self.inner.lock();
        if inner.dirs.put(path, record) {
            inner.evictions += 1;
        }
    }

    fn remove_dir(&self, path: &Path) -> Option<DirCacheRecord> {
        self.inner.lock().dirs.remove(path)
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.files.entries.clear();
        inner.dirs.entries.clear();
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            file_entries: inner.files.entries.len(),
            dir_entries: inner.dirs.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }
}
