//! Content-addressed hashing of files and directory trees
//!
//! A file's identity is the digest of its bytes; a directory's identity is
//! the digest of its children's hex digests. Two trees with the same content
//! hash the same regardless of where they live on disk.

pub mod engine;
pub mod hasher;
pub mod manifest;
pub mod path;
pub mod walker;

pub use engine::{HashEngine, LogSink, StatsSnapshot, TracingSink};
pub use hasher::Algorithm;
pub use manifest::{diff_manifests, DirectoryHash, FileHashEntry, ManifestDiff, ManifestSnapshot};
pub use walker::{EntryKind, Filesystem, LocalFilesystem};
