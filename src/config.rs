//! Configuration System
//!
//! Layered configuration for the hash engine, its cache, and logging.
//! Precedence (lowest to highest): built-in defaults, global config file,
//! workspace config files, `PORTAL_HASH__*` environment variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::hasher::Algorithm;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod sources;

/// Environment prefix for overrides, e.g. `PORTAL_HASH__HASHER__ALGORITHM=blake3`
pub const ENV_PREFIX: &str = "PORTAL_HASH";

/// Order in which subdirectory digests are folded into a directory hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubdirectoryOrder {
    /// Byte order of names, as a POSIX directory listing returns them
    #[default]
    #[serde(alias = "listing")]
    Bytewise,
    /// Collated by name, same rule as files
    #[serde(alias = "sorted")]
    Collated,
}

/// How a cached directory hash is judged still valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectoryValidation {
    /// Only the directory's own mtime is compared. Misses edits to nested
    /// file contents, which do not touch the parent's mtime.
    #[default]
    DirectoryMtime,
    /// Also re-stats every file and subdirectory that fed the hash
    ContentStamps,
}

/// Hash engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub algorithm: Algorithm,
    /// Route engine diagnostics to the tracing log
    pub enable_logging: bool,
    /// Chunk size for streaming file content, in bytes
    pub read_buffer_size: usize,
    pub subdirectory_order: SubdirectoryOrder,
    pub directory_validation: DirectoryValidation,
}

pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            enable_logging: false,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            subdirectory_order: SubdirectoryOrder::default(),
            directory_validation: DirectoryValidation::default(),
        }
    }
}

/// Cache bounds; both unset means unbounded and never expiring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per table (files, directories)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Entry lifetime in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalHashConfig {
    pub hasher: HasherConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl PortalHashConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.hasher.read_buffer_size == 0 {
            errors.push("hasher.read_buffer_size must be greater than zero".to_string());
        }
        if self.cache.capacity == Some(0) {
            errors.push("cache.capacity must be greater than zero when set".to_string());
        }
        if self.cache.ttl_secs == Some(0) {
            errors.push("cache.ttl_secs must be greater than zero when set".to_string());
        }
        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML (used by `portal-hash config`)
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self).map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}

/// Loads [`PortalHashConfig`] from files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load with the full precedence chain for `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<PortalHashConfig, ApiError> {
        let builder = Config::builder();
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        Self::finish(builder)
    }

    /// Load a single explicit file (environment overrides still apply)
    pub fn load_from_file(path: &Path) -> Result<PortalHashConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = Config::builder().add_source(File::from(path.to_path_buf()));
        Self::finish(builder)
    }

    /// Global config path: `$XDG_CONFIG_HOME/portal-hash/config.toml`,
    /// falling back to `$HOME/.config/portal-hash/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    fn finish(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<PortalHashConfig, ApiError> {
        let config: PortalHashConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate().map_err(|errors| {
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })?;

        Ok(config)
    }
}
