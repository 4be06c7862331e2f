//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the symlink manager can be
//! unit-tested against injected failures without touching permissions on the
//! real filesystem.  Production code uses [`SystemFileSystemOps`].

use std::io;
use std::path::{Path, PathBuf};

/// What a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link (only reported when links are not followed).
    Symlink,
    /// A socket, FIFO, device, or anything else.
    Other,
}

impl NodeKind {
    fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "special file",
        }
    }
}

/// Abstraction over the filesystem calls made by the symlink manager.
///
/// Every query returns `Ok(None)` for a path that does not exist so that
/// "absent" is never confused with an I/O failure.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Kind of `path` without following a final symlink.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than `NotFound`.
    fn node_kind(&self, path: &Path) -> io::Result<Option<NodeKind>>;

    /// Kind of `path` after following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than `NotFound`.
    fn resolved_kind(&self, path: &Path) -> io::Result<Option<NodeKind>>;

    /// Read the destination of the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Atomically rename `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create `path` and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()>;
}

/// Map `NotFound` to `Ok(None)`.
fn optional<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn node_kind(&self, path: &Path) -> io::Result<Option<NodeKind>> {
        let meta = optional(std::fs::symlink_metadata(path))?;
        Ok(meta.map(|m| NodeKind::from_file_type(m.file_type())))
    }

    fn resolved_kind(&self, path: &Path) -> io::Result<Option<NodeKind>> {
        Ok(optional(std::fs::metadata(path))?.map(|m| NodeKind::from_file_type(m.file_type())))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(source, link)
        }

        #[cfg(not(unix))]
        {
            let _ = (source, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symbolic links are only supported on Unix platforms",
            ))
        }
    }
}

/// [`FileSystemOps`] wrapper that fails selected operations on chosen paths.
///
/// Everything else is delegated to [`SystemFileSystemOps`], so tests run
/// against a real temporary directory with a single injected fault.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FaultyFileSystemOps {
    fail_rename: Vec<PathBuf>,
    fail_symlink: Vec<PathBuf>,
}

#[cfg(test)]
impl FaultyFileSystemOps {
    /// Create a wrapper with no faults configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `rename` calls whose source is `path`.
    #[must_use]
    pub fn fail_rename(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_rename.push(path.into());
        self
    }

    /// Fail `symlink` calls whose link path is `path`.
    #[must_use]
    pub fn fail_symlink(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_symlink.push(path.into());
        self
    }
}

#[cfg(test)]
impl FileSystemOps for FaultyFileSystemOps {
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
        if self.fail_rename.iter().any(|p| p == from) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        SystemFileSystemOps.rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        SystemFileSystemOps.create_dir_all(path)
    }

    fn symlink(&self, source: &Path, link: &Path) -> io::Result<()> {
        if self.fail_symlink.iter().any(|p| p == link) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        SystemFileSystemOps.symlink(source, link)
    }
}
