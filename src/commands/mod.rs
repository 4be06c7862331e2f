//! Top-level command orchestration.
pub mod apply;
pub mod completions;
pub mod help;

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use crate::cli::Cli;
use crate::logging::Logger;
use crate::manager::ApplyReport;
use crate::mapping::{ConfigMapping, file};

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every selected entry converged (or would, under dry run).
    Success,
    /// At least one entry failed; the others were still processed.
    EntryFailed,
    /// Invalid arguments or configuration; nothing was touched.
    Fatal,
    /// Interrupted before every selected entry was processed.
    Interrupted,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::EntryFailed => 1,
            Self::Fatal => 2,
            Self::Interrupted => 130,
        }
    }

    /// Exit status for a finished run.
    #[must_use]
    pub fn from_report(report: &ApplyReport) -> Self {
        if report.interrupted {
            Self::Interrupted
        } else if report.has_failures() {
            Self::EntryFailed
        } else {
            Self::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// Load the mapping named on the command line (or the built-in table) and
/// apply any `--map` overrides.
///
/// # Errors
///
/// Returns an error if the mapping file cannot be loaded or an override is
/// invalid.
pub fn load_mapping(cli: &Cli) -> Result<ConfigMapping> {
    let mapping = match &cli.mapping {
        Some(path) => file::load(path)
            .with_context(|| format!("loading mapping file {}", path.display()))?,
        None => ConfigMapping::builtin().context("loading built-in mapping")?,
    };
    if cli.overrides.is_empty() {
        return Ok(mapping);
    }
    Ok(mapping.with_target_overrides(&cli.overrides)?)
}

/// Dispatch to help or apply.
///
/// # Errors
///
/// Returns an error for any fatal condition; the caller maps it to
/// [`ExitStatus::Fatal`].
pub fn run(cli: &Cli, log: &Logger) -> Result<ExitStatus> {
    let mapping = load_mapping(cli)?;
    match cli.selection_filter() {
        Some(filter) => apply::run(cli, &mapping, &filter, log),
        None => {
            help::print(&mapping)?;
            Ok(ExitStatus::Success)
        }
    }
}
