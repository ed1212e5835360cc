//! Configuration files driving engine construction

use portal_hash::config::{ConfigLoader, DirectoryValidation, SubdirectoryOrder};
use portal_hash::tree::hasher::{compute_hash, Algorithm};
use portal_hash::tree::HashEngine;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_engine_from_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("portal-hash.toml");
    fs::write(
        &config_path,
        r#"
[hasher]
algorithm = "sha512"
read_buffer_size = 16
subdirectory_order = "sorted"
directory_validation = "content-stamps"

[cache]
capacity = 64
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_path).unwrap();
    assert_eq!(config.hasher.algorithm, Algorithm::Sha512);
    assert_eq!(config.hasher.subdirectory_order, SubdirectoryOrder::Collated);
    assert_eq!(
        config.hasher.directory_validation,
        DirectoryValidation::ContentStamps
    );
    assert_eq!(config.cache.capacity, Some(64));

    let data = temp_dir.path().join("data.bin");
    fs::write(&data, "some content longer than sixteen bytes").unwrap();
    let engine = HashEngine::from_config(&config);
    let digest = engine.hash_file(&data).await.unwrap();
    assert_eq!(digest.len(), 128);
    assert_eq!(
        digest,
        compute_hash(Algorithm::Sha512, b"some content longer than sixteen bytes")
    );
}

#[test]
fn test_workspace_config_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("portal-hash.toml"),
        "[hasher]\nalgorithm = \"blake3\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert_eq!(config.hasher.algorithm, Algorithm::Blake3);
    assert_eq!(HashEngine::from_config(&config).algorithm(), Algorithm::Blake3);
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[hasher]\nalgorithm = \"md5\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&config_path).is_err());

    fs::write(&config_path, "[logging]\nlevel = \"chatty\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&config_path).is_err());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("nope.toml")).is_err());
}
