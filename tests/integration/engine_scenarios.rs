//! End-to-end hashing scenarios on real directory trees

use portal_hash::error::HashError;
use portal_hash::tree::hasher::{compute_hash, Algorithm};
use portal_hash::tree::{EntryKind, HashEngine};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sha(data: &str) -> String {
    compute_hash(Algorithm::Sha256, data.as_bytes())
}

/// a.txt = "x", b.txt = "y"
fn flat_fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "x").unwrap();
    fs::write(temp_dir.path().join("b.txt"), "y").unwrap();
    temp_dir
}

/// flat fixture plus sub/c.txt = "z"
fn nested_fixture() -> TempDir {
    let temp_dir = flat_fixture();
    fs::create_dir(temp_dir.path().join("sub")).unwrap();
    fs::write(temp_dir.path().join("sub").join("c.txt"), "z").unwrap();
    temp_dir
}

fn engine_at(root: &Path) -> HashEngine {
    HashEngine::default().with_manifest_root(root.to_path_buf())
}

#[tokio::test]
async fn test_flat_directory_aggregate() {
    let temp_dir = flat_fixture();
    let root = temp_dir.path();

    let result = engine_at(root).hash_directory(root, false).await.unwrap();

    let expected = sha(&format!("{}{}", sha("x"), sha("y")));
    assert_eq!(result.hash, expected);
    assert_eq!(result.contents.len(), 2);
    assert_eq!(result.contents[0].path, "a.txt");
    assert_eq!(result.contents[0].hash, sha("x"));
    assert_eq!(result.contents[1].path, "b.txt");
    assert!(result.contents.iter().all(|e| e.kind == EntryKind::File));
}

#[tokio::test]
async fn test_nested_directory_with_subdirectories() {
    let temp_dir = nested_fixture();
    let root = temp_dir.path();

    let result = engine_at(root).hash_directory(root, true).await.unwrap();

    let sub_hash = sha(&sha("z"));
    let expected = sha(&format!("{}{}{}", sha("x"), sha("y"), sub_hash));
    assert_eq!(result.hash, expected);
    assert_eq!(result.contents.len(), 3);

    let last = result.contents.last().unwrap();
    assert_eq!(last.kind, EntryKind::Directory);
    assert_eq!(last.name, "sub");
    assert_eq!(last.path, "sub");
    assert_eq!(last.hash, sub_hash);
}

#[tokio::test]
async fn test_nested_directory_without_subdirectories_ignores_them() {
    let nested = nested_fixture();
    let flat = flat_fixture();

    let nested_hash = engine_at(nested.path())
        .hash_directory(nested.path(), false)
        .await
        .unwrap();
    let flat_hash = engine_at(flat.path())
        .hash_directory(flat.path(), false)
        .await
        .unwrap();

    assert_eq!(nested_hash.hash, flat_hash.hash);
    assert_eq!(nested_hash.contents.len(), 2);
}

#[tokio::test]
async fn test_same_content_same_hash_regardless_of_location() {
    let first = nested_fixture();
    let second = nested_fixture();

    let a = HashEngine::default().hash_directory(first.path(), true).await.unwrap();
    let b = HashEngine::default().hash_directory(second.path(), true).await.unwrap();

    assert_eq!(a.hash, b.hash);
}

#[tokio::test]
async fn test_recursive_manifest_with_directory_entries() {
    let temp_dir = nested_fixture();
    let root = temp_dir.path();

    let entries = HashEngine::default()
        .hash_directory_recursively(root, true)
        .await
        .unwrap();

    assert_eq!(entries.len(), 4);
    let position = |path: &str| entries.iter().position(|e| e.path == path).unwrap();

    let sub = &entries[position("sub")];
    assert_eq!(sub.kind, EntryKind::Directory);
    assert_eq!(sub.hash, sha(&sha("z")));

    let nested_path = Path::new("sub").join("c.txt").to_string_lossy().into_owned();
    let nested = &entries[position(&nested_path)];
    assert_eq!(nested.kind, EntryKind::File);
    assert_eq!(nested.name, "c.txt");
    assert_eq!(nested.hash, sha("z"));

    // Directory entry precedes its contents
    assert!(position("sub") < position(&nested_path));
    assert_eq!(entries[position("a.txt")].hash, sha("x"));
}

#[tokio::test]
async fn test_recursive_manifest_without_directory_entries_still_descends() {
    let temp_dir = nested_fixture();

    let entries = HashEngine::default()
        .hash_directory_recursively(temp_dir.path(), false)
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.kind == EntryKind::File));
    assert!(entries.iter().any(|e| e.name == "c.txt"));
}

#[tokio::test]
async fn test_every_regular_file_appears_exactly_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for dir in ["one", "one/two", "three"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    let files = ["top.bin", "one/a", "one/two/b", "one/two/c", "three/d"];
    for (i, file) in files.iter().enumerate() {
        fs::write(root.join(file), format!("content {}", i)).unwrap();
    }

    let entries = HashEngine::default()
        .hash_directory_recursively(root, false)
        .await
        .unwrap();

    let mut paths: Vec<String> = entries.iter().map(|e| e.path.replace('\\', "/")).collect();
    paths.sort();
    let mut expected: Vec<String> = files.iter().map(|f| f.to_string()).collect();
    expected.sort();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn test_content_change_changes_every_ancestor() {
    let temp_dir = nested_fixture();
    let root = temp_dir.path();
    let before = HashEngine::default().hash_directory(root, true).await.unwrap();

    fs::write(root.join("sub").join("c.txt"), "Z").unwrap();
    let after = HashEngine::default().hash_directory(root, true).await.unwrap();

    assert_ne!(before.hash, after.hash);
    assert_eq!(before.contents[0], after.contents[0]);
    assert_ne!(before.contents[2].hash, after.contents[2].hash);
}

#[tokio::test]
async fn test_empty_file_and_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("empty"), "").unwrap();
    fs::create_dir(root.join("hollow")).unwrap();

    let engine = engine_at(root);
    assert_eq!(engine.hash_file(&root.join("empty")).await.unwrap(), sha(""));

    let result = engine.hash_directory(root, true).await.unwrap();
    assert_eq!(result.hash, sha(&format!("{}{}", sha(""), sha(""))));
}

#[tokio::test]
async fn test_missing_directory_errors() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("gone");
    let engine = HashEngine::default();

    let err = engine.hash_directory(&missing, false).await.unwrap_err();
    assert!(matches!(err, HashError::DirectoryAccess { .. }));
    assert_eq!(err.path(), Some(missing.as_path()));

    assert!(engine.hash_files_in_directory(&missing).await.is_err());
    assert!(engine.hash_directory_recursively(&missing, true).await.is_err());
}

#[tokio::test]
async fn test_default_manifest_paths_are_relative_to_working_directory() {
    let temp_dir = flat_fixture();
    let root = temp_dir.path();

    let entries = HashEngine::default()
        .hash_files_in_directory(root)
        .await
        .unwrap();

    let cwd = std::env::current_dir().unwrap();
    for entry in &entries {
        let resolved = cwd.join(&entry.path);
        assert_eq!(
            fs::read(&resolved).unwrap(),
            fs::read(root.join(&entry.name)).unwrap()
        );
    }
}

#[tokio::test]
async fn test_blake3_directory() {
    let temp_dir = flat_fixture();
    let engine = HashEngine::with_algorithm(Algorithm::Blake3);
    let result = engine.hash_directory(temp_dir.path(), false).await.unwrap();

    let hx = blake3::hash(b"x").to_hex().to_string();
    let hy = blake3::hash(b"y").to_hex().to_string();
    let expected = blake3::hash(format!("{}{}", hx, hy).as_bytes()).to_hex().to_string();
    assert_eq!(result.hash, expected);
}
