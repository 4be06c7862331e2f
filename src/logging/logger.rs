//! The process-wide [`Log`] that writes through `tracing`.
use std::path::{Path, PathBuf};

use super::types::{Log, LogKind};
use crate::manager::{ApplyReport, EntryStatus};

/// Sends messages to the global `tracing` subscriber installed by
/// [`init_subscriber`](super::init_subscriber) and remembers where the run
/// log lives so the summary can point at it.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for a run whose log is (or is not) written to `log_file`.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// The run log, if one is being written.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Print the end-of-run summary: one line per entry, its failure causes,
    /// then the totals.
    pub fn print_summary(&self, report: &ApplyReport) {
        if report.entries.is_empty() && !report.interrupted {
            return;
        }
        self.stage("Summary");

        for entry in &report.entries {
            let (mark, colour) = match entry.status {
                EntryStatus::Unchanged => ("·", "2"),
                EntryStatus::Created | EntryStatus::BackedUp => ("✓", "32"),
                EntryStatus::WouldCreate => ("~", "36"),
                EntryStatus::Failed => ("✗", "31"),
            };
            self.info(&format!(
                "\x1b[{colour}m{mark} {} ({})\x1b[0m",
                entry.name,
                entry.status.as_str()
            ));
            for reason in entry.failure_reasons() {
                self.info(&format!("    {reason}"));
            }
        }

        self.info(&totals_line(report));
        if report.interrupted {
            self.warn("interrupted; remaining entries were not processed");
        }
        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

fn totals_line(report: &ApplyReport) -> String {
    let c = &report.counts;
    let mut parts = vec![
        format!("{} unchanged", c.unchanged),
        format!("{} created", c.created),
        format!("{} backed up", c.backed_up),
    ];
    if report.dry_run {
        parts.push(format!("{} would change", c.would_create));
    }
    parts.push(format!("{} failed", c.failed));
    let n = report.entries.len();
    let noun = if n == 1 { "entry" } else { "entries" };
    format!("{n} {noun}: {}", parts.join(", "))
}

impl Log for Logger {
    fn record(&self, kind: LogKind, msg: &str) {
        kind.emit(msg);
    }
}
