//! Hash engine: cached digests for files and directory trees
//!
//! Files are digested by streaming their content; directories by folding the
//! hex digests of their files (collated by relative path) and, optionally,
//! of their subdirectories. Both results are cached against the metadata
//! they were computed from and reused while that metadata is unchanged.
//!
//! Concurrent calls for the same path are not deduplicated. Two callers may
//! both miss the cache and both store the same result.

use crate::config::{DirectoryValidation, HasherConfig, PortalHashConfig, SubdirectoryOrder};
use crate::error::HashError;
use crate::store::{ContentStamp, DirCacheRecord, FileCacheRecord, HashCache, MemoryCache};
use crate::tree::hasher::{fold_hashes, Algorithm, Digester};
use crate::tree::manifest::{DirectoryHash, FileHashEntry};
use crate::tree::path::{locale_cmp, relative_to};
use crate::tree::walker::{DirEntryInfo, Filesystem, LocalFilesystem, NodeKind};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

/// Consumer of engine diagnostics
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);

    /// Failures; defaults to [`LogSink::log`]
    fn error(&self, message: &str) {
        self.log(message);
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        debug!(target: "portal_hash::engine", "{}", message);
    }

    fn error(&self, message: &str) {
        warn!(target: "portal_hash::engine", "{}", message);
    }
}

#[derive(Debug, Default)]
struct EngineStats {
    files_hashed: AtomicU64,
    file_cache_hits: AtomicU64,
    directories_hashed: AtomicU64,
    directory_cache_hits: AtomicU64,
    bytes_read: AtomicU64,
}

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files whose content was streamed through the digest
    pub files_hashed: u64,
    pub file_cache_hits: u64,
    /// Directories whose aggregate was recomputed
    pub directories_hashed: u64,
    pub directory_cache_hits: u64,
    pub bytes_read: u64,
}

/// Computes and caches digests for files and directories
pub struct HashEngine {
    config: HasherConfig,
    cache: Arc<dyn HashCache>,
    fs: Arc<dyn Filesystem>,
    sink: Option<Arc<dyn LogSink>>,
    manifest_root: Option<PathBuf>,
    stats: EngineStats,
}

impl HashEngine {
    /// Engine over the local filesystem with an unbounded in-memory cache
    pub fn new(config: HasherConfig) -> Self {
        let sink: Option<Arc<dyn LogSink>> = if config.enable_logging {
            Some(Arc::new(TracingSink))
        } else {
            None
        };
        Self {
            config,
            cache: Arc::new(MemoryCache::new()),
            fs: Arc::new(LocalFilesystem),
            sink,
            manifest_root: None,
            stats: EngineStats::default(),
        }
    }

    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self::new(HasherConfig {
            algorithm,
            ..HasherConfig::default()
        })
    }

    /// Engine configured from a loaded [`PortalHashConfig`], cache bounds included
    pub fn from_config(config: &PortalHashConfig) -> Self {
        Self::new(config.hasher.clone()).with_cache(Arc::new(MemoryCache::from_config(&config.cache)))
    }

    pub fn with_cache(mut self, cache: Arc<dyn HashCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Make `hash_files_in_directory` / `hash_directory` manifest paths
    /// relative to `root` instead of the process working directory
    pub fn with_manifest_root(mut self, root: PathBuf) -> Self {
        self.manifest_root = Some(root);
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<dyn HashCache> {
        &self.cache
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_hashed: self.stats.files_hashed.load(Ordering::Relaxed),
            file_cache_hits: self.stats.file_cache_hits.load(Ordering::Relaxed),
            directories_hashed: self.stats.directories_hashed.load(Ordering::Relaxed),
            directory_cache_hits: self.stats.directory_cache_hits.load(Ordering::Relaxed),
            bytes_read: self.stats.bytes_read.load(Ordering::Relaxed),
        }
    }

    /// Drop cached results for `path`, whether it is a file or a directory
    pub fn invalidate(&self, path: &Path) {
        self.cache.remove_file(path);
        self.cache.remove_dir(path);
    }

    fn log(&self, message: impl FnOnce() -> String) {
        if let Some(sink) = &self.sink {
            sink.log(&message());
        }
    }

    fn log_error(&self, context: &str, error: &HashError) {
        if let Some(sink) = &self.sink {
            sink.error(&format!("{}: {}", context, error));
        }
    }

    /// (process cwd, base for manifest paths)
    fn path_roots(&self) -> Result<(PathBuf, PathBuf), HashError> {
        let cwd = std::env::current_dir().map_err(HashError::WorkingDirectory)?;
        let base = self.manifest_root.clone().unwrap_or_else(|| cwd.clone());
        Ok((cwd, base))
    }

    /// Digest of one file, reusing the cached value while mtime and size match
    pub async fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        self.log(|| format!("Hashing file: {}", path.display()));
        let result = self.hash_file_uncached_on_miss(path).await;
        if let Err(e) = &result {
            self.log_error("Error hashing file", e);
        }
        result
    }

    async fn hash_file_uncached_on_miss(&self, path: &Path) -> Result<String, HashError> {
        if let Some(record) = self.cache.get_file(path) {
            match self.fs.stat(path).await {
                Ok(stamp) if record.is_fresh(stamp.modified, stamp.size) => {
                    self.stats.file_cache_hits.fetch_add(1, Ordering::Relaxed);
                    self.log(|| format!("Cache hit for file: {}", path.display()));
                    return Ok(record.hash);
                }
                Ok(_) => {}
                // Fall through; the read below reports the real failure
                Err(e) => self.log(|| format!("Cache check failed for {}: {}", path.display(), e)),
            }
        }

        let digest = self.stream_digest(path).await?;

        let stamp = self
            .fs
            .stat(path)
            .await
            .map_err(|e| HashError::file(path, e))?;
        self.cache.put_file(
            path.to_path_buf(),
            FileCacheRecord {
                hash: digest.clone(),
                modified: stamp.modified,
                size: stamp.size,
            },
        );
        self.stats.files_hashed.fetch_add(1, Ordering::Relaxed);

        Ok(digest)
    }

    async fn stream_digest(&self, path: &Path) -> Result<String, HashError> {
        let mut reader = self
            .fs
            .open(path)
            .await
            .map_err(|e| HashError::file(path, e))?;
        let mut digester = Digester::new(self.config.algorithm);
        let mut buffer = vec![0u8; self.config.read_buffer_size.max(1)];

        loop {
            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|e| HashError::file(path, e))?;
            if n == 0 {
                break;
            }
            digester.update(&buffer[..n]);
            self.stats.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
        }

        Ok(digester.finalize_hex())
    }

    /// Digests of the regular files directly inside `dir`, in name byte order
    ///
    /// Entry paths are relative to the process working directory (or the
    /// manifest root, if one was set), not to `dir`.
    pub async fn hash_files_in_directory(
        &self,
        dir: &Path,
    ) -> Result<Vec<FileHashEntry>, HashError> {
        self.log(|| format!("Hashing files in directory: {}", dir.display()));
        let result = self.collect_file_entries(dir).await;
        if let Err(e) = &result {
            self.log_error("Error hashing files in directory", e);
        }
        result
    }

    /// Entries of `dir` sorted by the bytes of their names, the order a
    /// POSIX `scandir` listing yields whatever the backend returns
    async fn list_directory(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, HashError> {
        let mut entries = self
            .fs
            .read_dir(dir)
            .await
            .map_err(|e| HashError::directory(dir, e))?;
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Ok(entries)
    }

    async fn collect_file_entries(&self, dir: &Path) -> Result<Vec<FileHashEntry>, HashError> {
        let listing = self.list_directory(dir).await?;
        let (cwd, base) = self.path_roots()?;
        let (cwd, base) = (&cwd, &base);

        let tasks = listing.into_iter().map(|entry| async move {
            let path = dir.join(&entry.name);
            let stamp = self
                .fs
                .stat(&path)
                .await
                .map_err(|e| HashError::file(&path, e))?;
            if stamp.kind != NodeKind::File {
                return Ok::<_, HashError>(None);
            }
            let hash = self.hash_file(&path).await?;
            let relative = relative_to(cwd, base, &path);
            Ok(Some(FileHashEntry::file(entry.name, hash, relative)))
        });

        let entries = try_join_all(tasks).await?;
        Ok(entries.into_iter().flatten().collect())
    }

    /// Aggregate digest of `dir` plus the manifest it was folded from
    ///
    /// Files are folded in collated path order. With
    /// `include_subdirectories`, each subdirectory's aggregate is appended
    /// afterwards, in name byte order unless configured otherwise.
    pub fn hash_directory<'a>(
        &'a self,
        dir: &'a Path,
        include_subdirectories: bool,
    ) -> BoxFuture<'a, Result<DirectoryHash, HashError>> {
        async move {
            let (hash, _) = self.hash_directory_stamped(dir, include_subdirectories).await?;
            Ok(hash)
        }
        .boxed()
    }

    fn hash_directory_stamped<'a>(
        &'a self,
        dir: &'a Path,
        include_subdirectories: bool,
    ) -> BoxFuture<'a, Result<(DirectoryHash, Vec<ContentStamp>), HashError>> {
        async move {
            self.log(|| format!("Hashing directory: {}", dir.display()));
            let result = self.compute_directory(dir, include_subdirectories).await;
            if let Err(e) = &result {
                self.log_error("Error hashing directory", e);
            }
            result
        }
        .boxed()
    }

    async fn compute_directory(
        &self,
        dir: &Path,
        include_subdirectories: bool,
    ) -> Result<(DirectoryHash, Vec<ContentStamp>), HashError> {
        if let Some(hit) = self.cached_directory(dir, include_subdirectories).await {
            return Ok(hit);
        }

        let track_stamps = self.config.directory_validation == DirectoryValidation::ContentStamps;
        let mut stamps = Vec::new();

        let mut contents = self.hash_files_in_directory(dir).await?;
        contents.sort_by(|a, b| locale_cmp(&a.path, &b.path));

        if track_stamps {
            for entry in &contents {
                let path = dir.join(&entry.name);
                let stamp = self
                    .fs
                    .stat(&path)
                    .await
                    .map_err(|e| HashError::file(&path, e))?;
                stamps.push(ContentStamp {
                    path,
                    modified: stamp.modified,
                    size: Some(stamp.size),
                });
            }
        }

        if include_subdirectories {
            let (cwd, base) = self.path_roots()?;
            for sub in self.subdirectories(dir).await? {
                let sub_path = dir.join(&sub.name);
                let (sub_hash, sub_stamps) = self.hash_directory_stamped(&sub_path, true).await?;
                contents.push(FileHashEntry::directory(
                    sub.name,
                    sub_hash.hash,
                    relative_to(&cwd, &base, &sub_path),
                ));
                stamps.extend(sub_stamps);
            }
        }

        // Files in collated order, then subdirectories in fold order
        let hash = fold_hashes(
            self.config.algorithm,
            contents.iter().map(|entry| entry.hash.as_str()),
        );

        let stamp = self
            .fs
            .stat(dir)
            .await
            .map_err(|e| HashError::directory(dir, e))?;
        if track_stamps {
            stamps.push(ContentStamp {
                path: dir.to_path_buf(),
                modified: stamp.modified,
                size: None,
            });
        }

        self.cache.put_dir(
            dir.to_path_buf(),
            DirCacheRecord {
                hash: hash.clone(),
                modified: stamp.modified,
                contents: contents.clone(),
                include_subdirectories,
                stamps: stamps.clone(),
            },
        );
        self.stats.directories_hashed.fetch_add(1, Ordering::Relaxed);

        Ok((DirectoryHash { hash, contents }, stamps))
    }

    async fn subdirectories(&self, dir: &Path) -> Result<Vec<DirEntryInfo>, HashError> {
        let mut subdirs: Vec<DirEntryInfo> = self
            .list_directory(dir)
            .await?
            .into_iter()
            .filter(|entry| entry.kind == NodeKind::Directory)
            .collect();
        if self.config.subdirectory_order == SubdirectoryOrder::Collated {
            subdirs.sort_by(|a, b| locale_cmp(&a.name, &b.name));
        }
        Ok(subdirs)
    }

    /// A cached directory result, if still valid under the configured rule
    async fn cached_directory(
        &self,
        dir: &Path,
        include_subdirectories: bool,
    ) -> Option<(DirectoryHash, Vec<ContentStamp>)> {
        let record = self.cache.get_dir(dir)?;
        if record.include_subdirectories != include_subdirectories {
            return None;
        }

        let current = self.fs.stat(dir).await.ok()?;
        if current.modified != record.modified {
            return None;
        }

        if self.config.directory_validation == DirectoryValidation::ContentStamps {
            for stamp in &record.stamps {
                let now = self.fs.stat(&stamp.path).await.ok()?;
                if now.modified != stamp.modified {
                    return None;
                }
                if let Some(size) = stamp.size {
                    if now.size != size {
                        return None;
                    }
                }
            }
        }

        self.stats
            .directory_cache_hits
            .fetch_add(1, Ordering::Relaxed);
        self.log(|| format!("Cache hit for directory: {}", dir.display()));
        Some((
            DirectoryHash {
                hash: record.hash,
                contents: record.contents,
            },
            record.stamps,
        ))
    }

    /// Flat depth-first manifest of the whole tree under `dir`
    ///
    /// Paths are relative to `dir`. Subdirectories are always descended;
    /// `include_subdirectories` only controls whether each one also gets a
    /// `directory` entry (emitted before its contents).
    pub async fn hash_directory_recursively(
        &self,
        dir: &Path,
        include_subdirectories: bool,
    ) -> Result<Vec<FileHashEntry>, HashError> {
        self.log(|| format!("Hashing directory recursively: {}", dir.display()));
        let mut results = Vec::new();
        let outcome = self
            .walk_directory(dir, PathBuf::new(), include_subdirectories, &mut results)
            .await;
        if let Err(e) = &outcome {
            self.log_error("Error hashing directory recursively", e);
        }
        outcome.map(|_| results)
    }

    fn walk_directory<'a>(
        &'a self,
        current: &'a Path,
        relative: PathBuf,
        include_subdirectories: bool,
        results: &'a mut Vec<FileHashEntry>,
    ) -> BoxFuture<'a, Result<(), HashError>> {
        async move {
            let listing = self.list_directory(current).await?;

            for entry in listing {
                let full_path = current.join(&entry.name);
                let relative_path = relative.join(&entry.name);

                match entry.kind {
                    NodeKind::File => {
                        let hash = self.hash_file(&full_path).await?;
                        results.push(FileHashEntry::file(
                            entry.name,
                            hash,
                            relative_path.to_string_lossy(),
                        ));
                    }
                    NodeKind::Directory => {
                        if include_subdirectories {
                            let dir_hash = self
                                .hash_directory(&full_path, include_subdirectories)
                                .await?;
                            results.push(FileHashEntry::directory(
                                entry.name.clone(),
                                dir_hash.hash,
                                relative_path.to_string_lossy(),
                            ));
                        }
                        self.walk_directory(
                            &full_path,
                            relative_path,
                            include_subdirectories,
                            results,
                        )
                        .await?;
                    }
                    NodeKind::Other => {}
                }
            }

            Ok(())
        }
        .boxed()
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new(HasherConfig::default())
    }
}
