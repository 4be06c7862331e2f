//! The apply command: link the selected entries.
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context as _, Result};

use super::ExitStatus;
use crate::cli::Cli;
use crate::logging::{Log, Logger};
use crate::manager::{self, ApplyOptions, ApplyReport, Context};
use crate::mapping::ConfigMapping;
use crate::operations::SystemFileSystemOps;
use crate::selection::SelectionFilter;
use crate::settings::Settings;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if settings cannot be resolved, the selection is
/// invalid, or the JSON report cannot be written.  Per-entry failures are
/// reported through the returned [`ExitStatus`] instead.
pub fn run(
    cli: &Cli,
    mapping: &ConfigMapping,
    filter: &SelectionFilter,
    log: &Logger,
) -> Result<ExitStatus> {
    log.debug(&format!("dotlinks {}", crate::VERSION));

    let settings = Settings::from_env(cli.root.as_deref(), cli.config_dir.as_deref())?;
    let paths = settings.path_context()?;
    log.debug(&format!("platform: {}", settings.os));
    log.debug(&format!("repository: {}", paths.repo_root.display()));
    log.debug(&format!("config root: {}", paths.config_dir.display()));

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(&cancel, log);

    let options = ApplyOptions::new(cli.dry_run).with_cancel_flag(cancel);
    let fs = SystemFileSystemOps;
    let ctx = Context::new(&paths, &fs, log);
    let report = manager::apply(mapping, filter, &options, &ctx)?;

    log.print_summary(&report);

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
        log.debug(&format!("report written to {}", path.display()));
    }

    Ok(ExitStatus::from_report(&report))
}

/// Set `flag` on Ctrl-C so the run stops before the next entry.
fn install_interrupt_handler(flag: &Arc<AtomicBool>, log: &dyn Log) {
    let flag = Arc::clone(flag);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        log.warn(&format!("cannot install interrupt handler: {e}"));
    }
}

/// Write `report` as pretty-printed JSON to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_report(report: &ApplyReport, path: &Path) -> Result<()> {
    let json = report.to_json().context("serializing report")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("writing report to {}", path.display()))
}
