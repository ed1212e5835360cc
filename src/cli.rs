//! CLI domain: parse, route, and output only.
//! Hashing lives in `tree`; route builds the engine and dispatches.

mod output;
mod parse;
mod route;

pub use output::{
    format_diff_text, format_directory_text, format_entries_text, format_json, map_error,
};
pub use parse::{Cli, Commands, OutputFormat};
pub use route::{CommandOutput, RunContext, EXIT_TREES_DIFFER};
