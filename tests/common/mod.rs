// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed home/repository pair and a fluent
// builder so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use dotlinks::logging::BufferedLog;
use dotlinks::manager::{self, ApplyOptions, ApplyReport, Context};
use dotlinks::mapping::ConfigMapping;
use dotlinks::operations::{FileSystemOps, NodeKind, SystemFileSystemOps};
use dotlinks::selection::SelectionFilter;
use dotlinks::settings::PathContext;

/// Fixed backup stamp so backup names are predictable.
pub const STAMP: &str = "20261018T091500";

/// An isolated `home/`, `repo/` and config root inside a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding everything else.
    pub root: tempfile::TempDir,
    /// Paths handed to the manager.
    pub paths: PathContext,
    /// Log captured from the last [`apply`](Self::apply).
    pub log: BufferedLog,
}

impl IntegrationTestContext {
    /// Create a context with empty `home/`, `repo/` and `cfg/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let paths = PathContext {
            home: root.path().join("home"),
            config_dir: root.path().join("cfg"),
            repo_root: root.path().join("repo"),
        };
        std::fs::create_dir_all(&paths.home).expect("create home");
        std::fs::create_dir_all(&paths.repo_root).expect("create repo");
        Self {
            root,
            paths,
            log: BufferedLog::new(),
        }
    }

    /// Path to the home directory.
    pub fn home(&self) -> &Path {
        &self.paths.home
    }

    /// Path to the config root.
    pub fn config_dir(&self) -> &Path {
        &self.paths.config_dir
    }

    /// Path to the repository root.
    pub fn repo(&self) -> &Path {
        &self.paths.repo_root
    }

    /// Run the manager with the real filesystem.
    pub fn apply(
        &self,
        mapping: &ConfigMapping,
        filter: &SelectionFilter,
        dry_run: bool,
    ) -> Result<ApplyReport, dotlinks::error::ManagerError> {
        self.apply_with(mapping, filter, dry_run, &SystemFileSystemOps)
    }

    /// Run the manager with an injected filesystem.
    pub fn apply_with(
        &self,
        mapping: &ConfigMapping,
        filter: &SelectionFilter,
        dry_run: bool,
        fs: &dyn FileSystemOps,
    ) -> Result<ApplyReport, dotlinks::error::ManagerError> {
        let options = ApplyOptions::new(dry_run).with_backup_stamp(STAMP);
        let ctx = Context::new(&self.paths, fs, &self.log);
        manager::apply(mapping, filter, &options, &ctx)
    }

    /// Every path under the temp root with its type and content (files) or
    /// destination (links), for byte-for-byte comparisons.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        let mut out = BTreeMap::new();
        walk(self.root.path(), &mut out);
        out
    }
}

fn walk(dir: &Path, out: &mut BTreeMap<PathBuf, String>) {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    entries.sort();
    for path in entries {
        let meta = std::fs::symlink_metadata(&path).expect("metadata");
        if meta.file_type().is_symlink() {
            let dest = std::fs::read_link(&path).expect("read link");
            out.insert(path, format!("link -> {}", dest.display()));
        } else if meta.is_dir() {
            out.insert(path.clone(), "dir".to_string());
            walk(&path, out);
        } else {
            let content = std::fs::read(&path).expect("read file");
            out.insert(path, format!("file {content:?}"));
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Create `repo/<rel>` as a file.
    pub fn with_source_file(self, rel: &str) -> Self {
        write_file(&self.ctx.paths.repo_root.join(rel), &format!("# {rel}\n"));
        self
    }

    /// Create `repo/<rel>` as a directory holding one file.
    pub fn with_source_dir(self, rel: &str) -> Self {
        write_file(&self.ctx.paths.repo_root.join(rel).join("init.lua"), "-- init\n");
        self
    }

    /// Create `home/<rel>` as a file with `content`.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.paths.home.join(rel), content);
        self
    }

    /// Create `home/<rel>` as a symlink to `dest`.
    pub fn with_home_link(self, rel: &str, dest: &Path) -> Self {
        let link = self.ctx.paths.home.join(rel);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("create link parent");
        }
        std::os::unix::fs::symlink(dest, link).expect("create link");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// [`FileSystemOps`] that refuses to create links at the given paths and
/// otherwise uses the real filesystem.
#[derive(Debug, Default)]
pub struct FailingSymlinkOps {
    deny: Vec<PathBuf>,
}

impl FailingSymlinkOps {
    /// Refuse to create a link at `path`.
    pub fn deny(mut self, path: impl Into<PathBuf>) -> Self {
        self.deny.push(path.into());
        self
    }
}

impl FileSystemOps for FailingSymlinkOps {
    fn node_kind(&self, path: &Path) -> io::Result<Option<NodeKind>> {
        SystemFileSystemOps.node_kind(path)
    }

    fn resolved_kind(&self, path: &Path) -> io::Result<Option<NodeKind>> {
        SystemFileSystemOps.resolved_kind(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        SystemFileSystemOps.read_link(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        SystemFileSystemOps.rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        SystemFileSystemOps.create_dir_all(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        if self.deny.iter().any(|p| p == link) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        SystemFileSystemOps.symlink(source, link)
    }
}
