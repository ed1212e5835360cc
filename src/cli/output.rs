//! CLI output: error mapping and human-readable / JSON formatting.

use crate::error::ApiError;
use crate::tree::manifest::{DirectoryHash, EntryKind, FileHashEntry, ManifestDiff};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    e.to_string()
}

pub fn format_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::File => "file",
        EntryKind::Directory => "dir",
    }
}

/// Manifest entries as a table (type, path, hash)
pub fn format_entries_text(entries: &[FileHashEntry]) -> String {
    if entries.is_empty() {
        return "No entries.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Type", "Path", "Hash"]);
    for entry in entries {
        table.add_row(vec![
            kind_label(entry.kind).to_string(),
            entry.path.clone(),
            entry.hash.clone(),
        ]);
    }
    table.to_string()
}

pub fn format_directory_text(dir: &str, result: &DirectoryHash) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(dir)));
    out.push_str(&format!("  Hash: {}\n", result.hash));
    out.push_str(&format!("  Entries: {}\n\n", result.contents.len()));
    out.push_str(&format_entries_text(&result.contents));
    out
}

pub fn format_diff_text(diff: &ManifestDiff) -> String {
    if diff.is_empty() {
        return "No changes.".to_string();
    }
    let mut lines = Vec::with_capacity(diff.len() + 1);
    lines.push(format!(
        "{} added, {} removed, {} changed",
        diff.added.len(),
        diff.removed.len(),
        diff.changed.len()
    ));
    for entry in &diff.added {
        lines.push(format!("{} {}", "+".green(), entry.path));
    }
    for entry in &diff.removed {
        lines.push(format!("{} {}", "-".red(), entry.path));
    }
    for entry in &diff.changed {
        lines.push(format!(
            "{} {} ({} -> {})",
            "~".yellow(),
            entry.path,
            short(&entry.previous_hash),
            short(&entry.current_hash)
        ));
    }
    lines.join("\n")
}

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}
