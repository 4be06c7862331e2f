//! Invocation settings gathered once at startup.
//!
//! Every value that comes from the process environment (home directory,
//! `CONFIG_DIR`, `DOTFILES_ROOT`) is collected here so that the manager
//! never reads the environment itself.
use std::path::{Component, Path, PathBuf};

use crate::error::ManagerError;
use crate::platform::{ConfigRoot, Os};

/// Explicit configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Detected (or injected) host OS.
    pub os: Os,
    /// The user's home directory.
    pub home: PathBuf,
    /// Config-root override; supersedes the platform default when set.
    pub config_dir: Option<PathBuf>,
    /// Absolute repository root that entry sources are resolved against.
    pub repo_root: PathBuf,
}

/// Resolved directories used to expand target templates and sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    /// Value of `${HOME}` and `~`.
    pub home: PathBuf,
    /// Value of `${CONFIG_DIR}`.
    pub config_dir: PathBuf,
    /// Repository root for entry sources.
    pub repo_root: PathBuf,
}

impl Settings {
    /// Build settings from parsed arguments and the process environment.
    ///
    /// `root` and `config_dir` come from the CLI (which also reads
    /// `DOTFILES_ROOT` and `CONFIG_DIR`); the home directory comes from
    /// `HOME`.  Relative paths are made absolute against the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::MissingHome`] if `HOME` is unset or empty.
    pub fn from_env(root: Option<&Path>, config_dir: Option<&Path>) -> Result<Self, ManagerError> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(ManagerError::MissingHome)?;
        let repo_root = root.map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self {
            os: Os::detect(),
            home: absolutize(&home),
            config_dir: config_dir
                .filter(|d| !d.as_os_str().is_empty())
                .map(absolutize),
            repo_root: absolutize(&repo_root),
        })
    }

    /// Resolve the directories used for template expansion.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnsupportedPlatform`] if the OS has no default
    /// config root and no override is set.
    pub fn path_context(&self) -> Result<PathContext, ManagerError> {
        let root = ConfigRoot::select(&self.os, self.config_dir.as_deref())?;
        Ok(PathContext {
            config_dir: root.resolve(&self.home),
            home: self.home.clone(),
            repo_root: self.repo_root.clone(),
        })
    }
}

/// Make `path` absolute against the current directory and normalise it
/// lexically.  Symlinks are not resolved.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&absolute)
}

/// Remove `.` components and fold `..` components without touching the
/// filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
