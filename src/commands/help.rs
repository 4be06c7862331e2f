//! Usage text followed by the entry list.
use std::fmt::Write as _;
use std::io::Write as _;

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::Cli;
use crate::manager::list_entries;
use crate::mapping::{ConfigMapping, EntryKind, TargetTemplate};

/// Render every entry as `name  source -> target[, target…]`, aligned on the
/// name column.  Directory sources get a trailing `/`.
#[must_use]
pub fn render_entry_list(mapping: &ConfigMapping) -> String {
    let entries = list_entries(mapping);
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

    let mut out = String::from("Entries:\n");
    if entries.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for entry in entries {
        let slash = if entry.kind == EntryKind::Directory { "/" } else { "" };
        let targets = entry
            .targets
            .iter()
            .map(TargetTemplate::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "  {:<width$}  {}{slash} -> {targets}",
            entry.name,
            entry.source.display(),
        );
    }
    out
}

/// Print usage and the entry list to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print(mapping: &ConfigMapping) -> Result<()> {
    let help = Cli::command().render_help();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{help}")?;
    write!(stdout, "{}", render_entry_list(mapping))?;
    Ok(())
}
