//! CLI route: single route table and run context. Builds the engine from
//! configuration and dispatches each command to it.

use crate::cli::output::{
    format_diff_text, format_directory_text, format_entries_text, format_json,
};
use crate::cli::parse::{Cli, Commands, OutputFormat};
use crate::config::{ConfigLoader, PortalHashConfig};
use crate::error::ApiError;
use crate::tree::engine::HashEngine;
use crate::tree::manifest::{diff_manifests, ManifestSnapshot};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Process exit status for `diff --exit-code` when the trees differ
pub const EXIT_TREES_DIFFER: i32 = 2;

/// Rendered command result plus the exit status it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub status: i32,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self { text, status: 0 }
    }
}

/// Runtime context for CLI execution: loaded config, engine, async runtime.
pub struct RunContext {
    config: PortalHashConfig,
    engine: HashEngine,
    format: OutputFormat,
    runtime: Runtime,
}

impl RunContext {
    /// Load configuration for `workspace_root` (or `config_path` alone) and
    /// build an engine from it.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::with_config(config)
    }

    /// Build from parsed CLI flags; `--algorithm` overrides the config file
    /// and `--verbose` turns on the engine's per-operation diagnostics.
    pub fn from_cli(cli: &Cli) -> Result<Self, ApiError> {
        let mut context = Self::new(cli.workspace.clone(), cli.config.clone())?;
        let mut rebuild = false;
        if let Some(algorithm) = cli.algorithm {
            context.config.hasher.algorithm = algorithm;
            rebuild = true;
        }
        if cli.verbose && !context.config.hasher.enable_logging {
            context.config.hasher.enable_logging = true;
            rebuild = true;
        }
        if rebuild {
            context.engine = HashEngine::from_config(&context.config);
        }
        context.format = cli.format;
        Ok(context)
    }

    pub fn with_config(config: PortalHashConfig) -> Result<Self, ApiError> {
        let runtime = Runtime::new()?;
        let engine = HashEngine::from_config(&config);
        Ok(Self {
            config,
            engine,
            format: OutputFormat::Text,
            runtime,
        })
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn config(&self) -> &PortalHashConfig {
        &self.config
    }

    pub fn engine(&self) -> &HashEngine {
        &self.engine
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        debug!(?command, algorithm = %self.engine.algorithm(), "Executing command");
        let output = match command {
            Commands::File { path } => self.handle_file(path).map(CommandOutput::ok),
            Commands::Files { dir } => self.handle_files(dir).map(CommandOutput::ok),
            Commands::Dir { dir, subdirs } => self.handle_dir(dir, *subdirs).map(CommandOutput::ok),
            Commands::Tree {
                dir,
                subdirs,
                output,
            } => self
                .handle_tree(dir, *subdirs, output.as_deref())
                .map(CommandOutput::ok),
            Commands::Diff {
                snapshot,
                dir,
                subdirs,
                exit_code,
            } => self.handle_diff(snapshot, dir, *subdirs, *exit_code),
            Commands::Config => self.config.to_toml().map(CommandOutput::ok),
        }?;
        let stats = self.engine.stats();
        info!(
            files_hashed = stats.files_hashed,
            file_cache_hits = stats.file_cache_hits,
            directories_hashed = stats.directories_hashed,
            directory_cache_hits = stats.directory_cache_hits,
            bytes_read = stats.bytes_read,
            "Command finished"
        );
        Ok(output)
    }

    fn handle_file(&self, path: &Path) -> Result<String, ApiError> {
        let hash = self.runtime.block_on(self.engine.hash_file(path))?;
        match self.format {
            OutputFormat::Json => format_json(&json!({
                "path": path.display().to_string(),
                "algorithm": self.engine.algorithm(),
                "hash": hash,
            })),
            OutputFormat::Text => Ok(format!("{}  {}", hash, path.display())),
        }
    }

    fn handle_files(&self, dir: &Path) -> Result<String, ApiError> {
        let entries = self
            .runtime
            .block_on(self.engine.hash_files_in_directory(dir))?;
        match self.format {
            OutputFormat::Json => format_json(&entries),
            OutputFormat::Text => Ok(format_entries_text(&entries)),
        }
    }

    fn handle_dir(&self, dir: &Path, subdirs: bool) -> Result<String, ApiError> {
        let result = self
            .runtime
            .block_on(self.engine.hash_directory(dir, subdirs))?;
        match self.format {
            OutputFormat::Json => format_json(&result),
            OutputFormat::Text => Ok(format_directory_text(&dir.display().to_string(), &result)),
        }
    }

    fn handle_tree(
        &self,
        dir: &Path,
        subdirs: bool,
        output: Option<&Path>,
    ) -> Result<String, ApiError> {
        let entries = self
            .runtime
            .block_on(self.engine.hash_directory_recursively(dir, subdirs))?;
        let snapshot = ManifestSnapshot::new(
            dir.display().to_string(),
            self.engine.algorithm(),
            entries,
        );

        if let Some(path) = output {
            std::fs::write(path, format_json(&snapshot)?)?;
            info!(path = %path.display(), entries = snapshot.entries.len(), "Snapshot written");
            return Ok(format!(
                "Wrote {} entries to {}",
                snapshot.entries.len(),
                path.display()
            ));
        }

        match self.format {
            OutputFormat::Json => format_json(&snapshot),
            OutputFormat::Text => Ok(format_entries_text(&snapshot.entries)),
        }
    }

    fn handle_diff(
        &self,
        snapshot_path: &Path,
        dir: &Path,
        subdirs: bool,
        exit_code: bool,
    ) -> Result<CommandOutput, ApiError> {
        let raw = std::fs::read_to_string(snapshot_path).map_err(|e| {
            ApiError::ManifestError(format!(
                "Cannot read snapshot {}: {}",
                snapshot_path.display(),
                e
            ))
        })?;
        let snapshot: ManifestSnapshot = serde_json::from_str(&raw)?;

        // Digests are only comparable under the algorithm that produced them
        let current = if snapshot.algorithm == self.engine.algorithm() {
            self.runtime
                .block_on(self.engine.hash_directory_recursively(dir, subdirs))?
        } else {
            info!(algorithm = %snapshot.algorithm, "Using snapshot algorithm for comparison");
            let mut config = self.config.clone();
            config.hasher.algorithm = snapshot.algorithm;
            let engine = HashEngine::from_config(&config);
            self.runtime
                .block_on(engine.hash_directory_recursively(dir, subdirs))?
        };

        let diff = diff_manifests(&snapshot.entries, &current);
        let status = if exit_code && !diff.is_empty() {
            EXIT_TREES_DIFFER
        } else {
            0
        };
        let text = match self.format {
            OutputFormat::Json => format_json(&diff)?,
            OutputFormat::Text => format_diff_text(&diff),
        };
        Ok(CommandOutput { text, status })
    }
}
