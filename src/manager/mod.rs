//! The symlink manager: resolve selected entries and converge their links.
//!
//! Entries are processed strictly in mapping order.  Fatal problems
//! (unknown names, duplicate targets) are detected before the first
//! filesystem mutation; per-entry problems are recorded in the
//! [`ApplyReport`] and never stop the remaining entries.
pub mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EntryError, ManagerError};
use crate::logging::Log;
use crate::mapping::{ConfigEntry, ConfigMapping, EntryKind};
use crate::operations::{FileSystemOps, NodeKind};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Resource, ResourceChange, backup};
use crate::selection::SelectionFilter;
use crate::settings::{PathContext, normalize};

pub use report::{
    ApplyReport, EntryReport, EntryStatus, Failure, ReportCounts, TargetOutcome, TargetReport,
};

/// Per-run options.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Report intended actions without mutating anything.
    pub dry_run: bool,
    /// Stamp embedded in backup names, fixed for the whole run.
    pub backup_stamp: String,
    /// Set from another thread to stop before the next entry.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ApplyOptions {
    /// Options with a backup stamp taken from the current local time.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            backup_stamp: backup::current_stamp(),
            cancel: None,
        }
    }

    /// Use a fixed backup stamp.
    #[must_use]
    pub fn with_backup_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.backup_stamp = stamp.into();
        self
    }

    /// Stop processing once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Shared collaborators for a run.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Resolved home, config root and repository root.
    pub paths: &'a PathContext,
    /// Filesystem access.
    pub fs: &'a dyn FileSystemOps,
    /// Progress and diagnostics sink.
    pub log: &'a dyn Log,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("paths", self.paths)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// Bundle the collaborators for a run.
    #[must_use]
    pub const fn new(paths: &'a PathContext, fs: &'a dyn FileSystemOps, log: &'a dyn Log) -> Self {
        Self { paths, fs, log }
    }
}

/// The full mapping in declaration order.
#[must_use]
pub fn list_entries(mapping: &ConfigMapping) -> &[ConfigEntry] {
    mapping.entries()
}

/// The absolute source path of `entry` inside the repository.
#[must_use]
pub fn resolve_source(entry: &ConfigEntry, paths: &PathContext) -> PathBuf {
    normalize(&paths.repo_root.join(&entry.source))
}

/// The absolute target paths of `entry`, in declaration order.
#[must_use]
pub fn resolve_targets(entry: &ConfigEntry, paths: &PathContext) -> Vec<PathBuf> {
    entry
        .targets
        .iter()
        .map(|t| normalize(&t.expand(paths)))
        .collect()
}

/// Select entries and reject any two that share a resolved target.
///
/// Nothing is touched on disk.
///
/// # Errors
///
/// Returns [`ManagerError::UnknownSelectionName`] or
/// [`ManagerError::DuplicateTarget`].
pub fn plan<'m>(
    mapping: &'m ConfigMapping,
    filter: &SelectionFilter,
    paths: &PathContext,
) -> Result<Vec<&'m ConfigEntry>, ManagerError> {
    let selected = filter.select(mapping)?;
    check_duplicate_targets(&selected, paths)?;
    Ok(selected)
}

fn check_duplicate_targets(
    entries: &[&ConfigEntry],
    paths: &PathContext,
) -> Result<(), ManagerError> {
    let mut owners: BTreeMap<PathBuf, &str> = BTreeMap::new();
    for entry in entries {
        for target in resolve_targets(entry, paths) {
            if let Some(first) = owners.get(&target) {
                return Err(ManagerError::DuplicateTarget {
                    path: target,
                    names: vec![(*first).to_string(), entry.name.clone()],
                });
            }
            owners.insert(target, &entry.name);
        }
    }
    Ok(())
}

/// Converge the links of every selected entry.
///
/// # Errors
///
/// Fails only for the fatal conditions of [`plan`], before any mutation.
/// Per-entry failures are recorded in the returned report.
pub fn apply(
    mapping: &ConfigMapping,
    filter: &SelectionFilter,
    options: &ApplyOptions,
    ctx: &Context<'_>,
) -> Result<ApplyReport, ManagerError> {
    let selected = plan(mapping, filter, ctx.paths)?;
    let mut report = ApplyReport::new(options.dry_run);

    if selected.is_empty() {
        ctx.log.warn("no entries selected");
        return Ok(report);
    }

    ctx.log.stage(if options.dry_run {
        "Planning symlinks"
    } else {
        "Linking"
    });

    for entry in selected {
        if options.is_cancelled() {
            ctx.log.warn(&format!("interrupted before {}", entry.name));
            report.interrupted = true;
            break;
        }
        report.push(process_entry(entry, options, ctx));
    }
    Ok(report)
}

fn process_entry(entry: &ConfigEntry, options: &ApplyOptions, ctx: &Context<'_>) -> EntryReport {
    let source = resolve_source(entry, ctx.paths);
    ctx.log
        .debug(&format!("{}: source {}", entry.name, source.display()));

    if let Err(e) = check_source(entry, &source, ctx.fs) {
        ctx.log.error(&format!("{}: {e}", entry.name));
        return EntryReport::source_failed(&entry.name, source, &e);
    }

    let targets = resolve_targets(entry, ctx.paths)
        .into_iter()
        .map(|path| {
            let outcome = process_target(entry, &source, &path, options, ctx);
            TargetReport { path, outcome }
        })
        .collect();
    EntryReport::with_targets(&entry.name, source, targets)
}

fn check_source(
    entry: &ConfigEntry,
    source: &Path,
    fs: &dyn FileSystemOps,
) -> Result<(), EntryError> {
    let kind = fs
        .resolved_kind(source)
        .map_err(|e| EntryError::filesystem("inspect source", source, e))?;
    match (entry.kind, kind) {
        (_, None) => Err(EntryError::MissingSource(source.to_path_buf())),
        (EntryKind::File, Some(NodeKind::File))
        | (EntryKind::Directory, Some(NodeKind::Directory)) => Ok(()),
        (expected, Some(actual)) => Err(EntryError::KindMismatch {
            path: source.to_path_buf(),
            expected,
            actual: actual.as_str().to_string(),
        }),
    }
}

fn process_target(
    entry: &ConfigEntry,
    source: &Path,
    target: &Path,
    options: &ApplyOptions,
    ctx: &Context<'_>,
) -> TargetOutcome {
    let resource = SymlinkResource::new(
        source.to_path_buf(),
        target.to_path_buf(),
        ctx.fs,
        &options.backup_stamp,
    );
    match resource.converge(options.dry_run) {
        Ok(change) => {
            log_change(ctx.log, &entry.name, &resource, &change);
            change.into()
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e}", entry.name));
            TargetOutcome::Failed(Failure::from(&e))
        }
    }
}

fn log_change(log: &dyn Log, name: &str, resource: &SymlinkResource<'_>, change: &ResourceChange) {
    let link = resource.description();
    match change {
        ResourceChange::AlreadyCorrect => log.debug(&format!("{name}: already linked {link}")),
        ResourceChange::Created => log.info(&format!("{name}: linked {link}")),
        ResourceChange::BackedUp { backup } => {
            log.info(&format!(
                "{name}: backed up {} to {}",
                resource.target.display(),
                backup.display()
            ));
            log.info(&format!("{name}: linked {link}"));
        }
        ResourceChange::WouldCreate { backup: None } => {
            log.dry_run(&format!("{name}: would link {link}"));
        }
        ResourceChange::WouldCreate {
            backup: Some(backup),
        } => log.dry_run(&format!(
            "{name}: would back up {} to {} and link {link}",
            resource.target.display(),
            backup.display()
        )),
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::logging::BufferedLog;
    use crate::operations::{FaultyFileSystemOps, SystemFileSystemOps};

    const STAMP: &str = "20261018T091500";

    struct Fixture {
        _dir: tempfile::TempDir,
        paths: PathContext,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let home = dir.path().join("home");
            let paths = PathContext {
                config_dir: home.join(".config"),
                home,
                repo_root: dir.path().join("repo"),
            };
            std::fs::create_dir_all(&paths.home).unwrap();
            std::fs::create_dir_all(&paths.repo_root).unwrap();
            Self { _dir: dir, paths }
        }

        fn source_file(&self, rel: &str) {
            let path = self.paths.repo_root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, format!("# {rel}")).unwrap();
        }

        fn source_dir(&self, rel: &str) {
            std::fs::create_dir_all(self.paths.repo_root.join(rel)).unwrap();
        }
    }

    fn entry(name: &str, source: &str, targets: &[&str], kind: EntryKind) -> ConfigEntry {
        ConfigEntry::new(name, source, targets, kind).unwrap()
    }

    fn options(dry_run: bool) -> ApplyOptions {
        ApplyOptions::new(dry_run).with_backup_stamp(STAMP)
    }

    #[test]
    fn resolve_targets_expands_templates() {
        let fx = Fixture::new();
        let e = entry(
            "vscode",
            "vscode/settings.json",
            &["${CONFIG_DIR}/Code/User/settings.json", "~/.vscode.json"],
            EntryKind::File,
        );
        assert_eq!(
            resolve_targets(&e, &fx.paths),
            vec![
                fx.paths.config_dir.join("Code/User/settings.json"),
                fx.paths.home.join(".vscode.json"),
            ]
        );
        assert_eq!(
            resolve_source(&e, &fx.paths),
            fx.paths.repo_root.join("vscode/settings.json")
        );
    }

    #[test]
    fn list_entries_keeps_declaration_order() {
        let mapping = ConfigMapping::builtin().unwrap();
        let names: Vec<&str> = list_entries(&mapping).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"bashrc"));
        assert_eq!(names.last(), Some(&"cursor"));
    }

    #[test]
    fn apply_creates_then_is_idempotent() {
        let fx = Fixture::new();
        fx.source_file("bashrc");
        let bashrc = entry("bashrc", "bashrc", &["${HOME}/.bashrc"], EntryKind::File);
        let mapping = ConfigMapping::new(vec![bashrc]).unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let first = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        assert_eq!(first.entries[0].status, EntryStatus::Created);
        assert_eq!(
            std::fs::read_link(fx.paths.home.join(".bashrc")).unwrap(),
            fx.paths.repo_root.join("bashrc")
        );

        let second = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        assert_eq!(second.entries[0].status, EntryStatus::Unchanged);
        assert_eq!(second.counts.unchanged, 1);
        assert_eq!(second.counts.created, 0);
    }

    #[test]
    fn missing_source_fails_only_that_entry() {
        let fx = Fixture::new();
        fx.source_file("tmux.conf");
        let mapping = ConfigMapping::new(vec![
            entry("npmrc", "npmrc", &["~/.npmrc"], EntryKind::File),
            entry("tmux", "tmux.conf", &["~/.tmux.conf"], EntryKind::File),
        ])
        .unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        let npmrc = report.entry("npmrc").unwrap();
        assert!(npmrc.is_failed());
        assert_eq!(npmrc.failure.as_ref().unwrap().kind, FailureKind::MissingSource);
        assert_eq!(report.entry("tmux").unwrap().status, EntryStatus::Created);
        assert!(!fx.paths.home.join(".npmrc").exists());
        assert!(log.contains("source does not exist"));
    }

    #[test]
    fn kind_mismatch_fails_the_entry() {
        let fx = Fixture::new();
        fx.source_file("nvim");
        let mapping = ConfigMapping::new(vec![entry(
            "nvim",
            "nvim",
            &["${CONFIG_DIR}/nvim"],
            EntryKind::Directory,
        )])
        .unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        let failure = report.entries[0].failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::KindMismatch);
        assert!(failure.reason.contains("expected a directory"));
        assert!(!fx.paths.config_dir.join("nvim").exists());
    }

    #[test]
    fn directory_entry_links_the_directory() {
        let fx = Fixture::new();
        fx.source_dir("nvim-plugins");
        let mapping = ConfigMapping::new(vec![entry(
            "nvim-plugins",
            "nvim-plugins",
            &["${CONFIG_DIR}/nvim"],
            EntryKind::Directory,
        )])
        .unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        assert_eq!(report.entries[0].status, EntryStatus::Created);
        assert!(fx.paths.config_dir.join("nvim").is_dir());
    }

    #[test]
    fn dry_run_reports_without_mutation() {
        let fx = Fixture::new();
        fx.source_file("bashrc");
        std::fs::write(fx.paths.home.join(".bashrc"), "mine").unwrap();
        let mapping =
            ConfigMapping::new(vec![entry("bashrc", "bashrc", &["~/.bashrc"], EntryKind::File)])
                .unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(&mapping, &SelectionFilter::all(), &options(true), &ctx).unwrap();
        assert!(report.dry_run);
        assert_eq!(
            report.entries[0].targets[0].outcome,
            TargetOutcome::WouldCreate {
                backup: Some(fx.paths.home.join(".bashrc.backup.20261018T091500"))
            }
        );
        assert_eq!(
            std::fs::read_to_string(fx.paths.home.join(".bashrc")).unwrap(),
            "mine"
        );
        assert!(log.contains("would back up"));
    }

    #[test]
    fn duplicate_targets_abort_before_mutation() {
        let fx = Fixture::new();
        fx.source_dir("a");
        fx.source_dir("b");
        let mapping = ConfigMapping::new(vec![
            entry("a", "a", &["${CONFIG_DIR}/nvim"], EntryKind::Directory),
            entry("b", "b", &["~/.config/nvim"], EntryKind::Directory),
        ])
        .unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let err = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::DuplicateTarget { ref names, .. } if names == &["a", "b"]
        ));
        assert!(!fx.paths.config_dir.join("nvim").exists());

        let report = apply(
            &mapping,
            &SelectionFilter::all().excluding(["b"]),
            &options(false),
            &ctx,
        )
        .unwrap();
        assert_eq!(report.entries.len(), 1);
    }

    #[test]
    fn filesystem_failure_is_isolated_per_target() {
        let fx = Fixture::new();
        fx.source_file("a");
        fx.source_file("b");
        let mapping = ConfigMapping::new(vec![
            entry("a", "a", &["~/.a"], EntryKind::File),
            entry("b", "b", &["~/.b"], EntryKind::File),
        ])
        .unwrap();
        let fs = FaultyFileSystemOps::new().fail_symlink(fx.paths.home.join(".a"));
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &fs, &log);

        let report = apply(&mapping, &SelectionFilter::all(), &options(false), &ctx).unwrap();
        let a = report.entry("a").unwrap();
        assert!(a.is_failed());
        assert!(matches!(
            &a.targets[0].outcome,
            TargetOutcome::Failed(f) if f.kind == FailureKind::Filesystem
        ));
        assert_eq!(report.entry("b").unwrap().status, EntryStatus::Created);
        assert_eq!(report.counts.failed, 1);
        assert_eq!(report.counts.created, 1);
    }

    #[test]
    fn cancelled_run_stops_before_next_entry() {
        let fx = Fixture::new();
        fx.source_file("a");
        let mapping =
            ConfigMapping::new(vec![entry("a", "a", &["~/.a"], EntryKind::File)]).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(
            &mapping,
            &SelectionFilter::all(),
            &options(false).with_cancel_flag(flag),
            &ctx,
        )
        .unwrap();
        assert!(report.interrupted);
        assert!(report.entries.is_empty());
        assert!(!fx.paths.home.join(".a").exists());
    }

    #[test]
    fn empty_selection_is_not_an_error() {
        let fx = Fixture::new();
        let mapping = ConfigMapping::builtin().unwrap();
        let log = BufferedLog::new();
        let ctx = Context::new(&fx.paths, &SystemFileSystemOps, &log);

        let report = apply(
            &mapping,
            &SelectionFilter::only(["git"]).excluding(["git"]),
            &options(false),
            &ctx,
        )
        .unwrap();
        assert!(report.entries.is_empty());
        assert!(log.contains("no entries selected"));
    }
}
