//! Portal Hash: content-addressed directory hashing
//!
//! Computes stable digests for files and directory trees, caches them
//! against filesystem metadata, and emits manifests that can be compared to
//! decide which parts of an installed tree are out of date.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tree;

pub use config::{ConfigLoader, PortalHashConfig};
pub use error::{ApiError, HashError};
pub use store::{HashCache, MemoryCache};
pub use tree::{
    Algorithm, DirectoryHash, EntryKind, FileHashEntry, HashEngine, ManifestDiff, ManifestSnapshot,
};
