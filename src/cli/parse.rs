//! CLI parse: clap types for portal-hash. No behavior; definitions only.

use crate::tree::hasher::Algorithm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// portal-hash - content-addressed hashing of files and directory trees
#[derive(Parser)]
#[command(name = "portal-hash")]
#[command(about = "Content-addressed hashing of files and directory trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (searched for config/portal-hash.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Digest algorithm (sha224, sha256, sha384, sha512, blake3)
    #[arg(long)]
    pub algorithm: Option<Algorithm>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose logging, including per-file hashing diagnostics
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Print the digest of a single file
    File {
        path: PathBuf,
    },
    /// Digest the regular files directly inside a directory
    Files {
        dir: PathBuf,
    },
    /// Aggregate hash of a directory plus its manifest
    Dir {
        dir: PathBuf,
        /// Fold subdirectory hashes into the aggregate
        #[arg(long)]
        subdirs: bool,
    },
    /// Flat manifest of every file under a directory
    Tree {
        dir: PathBuf,
        /// Also emit an entry for each subdirectory
        #[arg(long)]
        subdirs: bool,
        /// Write the manifest snapshot (JSON) to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare a saved manifest snapshot against a directory
    Diff {
        snapshot: PathBuf,
        dir: PathBuf,
        /// Include subdirectory entries in the comparison
        #[arg(long)]
        subdirs: bool,
        /// Exit with status 2 when the trees differ
        #[arg(long)]
        exit_code: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}
