//! Hash manifests and manifest comparison
//!
//! A manifest is the flat list of `{type, name, hash, path}` entries the
//! engine emits. Callers persist or transmit it (usually as JSON) and later
//! diff it against a fresh one to decide what needs downloading again.

use crate::tree::hasher::Algorithm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::tree::walker::EntryKind;

/// One manifest line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHashEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub hash: String,
    pub path: String,
}

impl FileHashEntry {
    pub fn file(name: impl Into<String>, hash: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.into(),
            hash: hash.into(),
            path: path.into(),
        }
    }

    pub fn directory(
        name: impl Into<String>,
        hash: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntryKind::Directory,
            name: name.into(),
            hash: hash.into(),
            path: path.into(),
        }
    }
}

/// Aggregate digest of a directory plus the manifest it was folded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryHash {
    pub hash: String,
    pub contents: Vec<FileHashEntry>,
}

/// A manifest with enough context to be compared later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSnapshot {
    pub root: String,
    pub algorithm: Algorithm,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<FileHashEntry>,
}

impl ManifestSnapshot {
    pub fn new(root: impl Into<String>, algorithm: Algorithm, entries: Vec<FileHashEntry>) -> Self {
        Self {
            root: root.into(),
            algorithm,
            generated_at: Utc::now(),
            entries,
        }
    }
}

/// An entry whose digest differs between two manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
    pub previous_hash: String,
    pub current_hash: String,
}

/// Result of comparing two manifests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDiff {
    pub added: Vec<FileHashEntry>,
    pub removed: Vec<FileHashEntry>,
    pub changed: Vec<ChangedEntry>,
}

impl ManifestDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

fn index(entries: &[FileHashEntry]) -> HashMap<(EntryKind, &str), &FileHashEntry> {
    entries
        .iter()
        .map(|entry| ((entry.kind, entry.path.as_str()), entry))
        .collect()
}

/// Compare two manifests entry by entry, keyed on `(type, path)`
///
/// Output lists follow the order of the manifest they come from, so a diff
/// of two traversal-ordered manifests reads in traversal order.
pub fn diff_manifests(previous: &[FileHashEntry], current: &[FileHashEntry]) -> ManifestDiff {
    let before = index(previous);
    let after = index(current);

    let mut diff = ManifestDiff::default();

    for entry in current {
        match before.get(&(entry.kind, entry.path.as_str())) {
            None => diff.added.push(entry.clone()),
            Some(old) if old.hash != entry.hash => diff.changed.push(ChangedEntry {
                kind: entry.kind,
                path: entry.path.clone(),
                previous_hash: old.hash.clone(),
                current_hash: entry.hash.clone(),
            }),
            Some(_) => {}
        }
    }

    for entry in previous {
        if !after.contains_key(&(entry.kind, entry.path.as_str())) {
            diff.removed.push(entry.clone());
        }
    }

    diff
}
