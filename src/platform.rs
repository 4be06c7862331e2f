//! Host platform detection and the config-root convention per platform.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ManagerError;

/// Detected operating system platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    /// Linux, using the XDG `~/.config` convention.
    Linux,
    /// macOS, using `~/Library/Application Support`.
    MacOs,
    /// Any other OS, identified by its `std::env::consts::OS` name.
    Other(String),
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

impl Os {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Map an OS identifier as reported by `std::env::consts::OS`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Where `${CONFIG_DIR}` points.
///
/// A closed set of strategies: the two platform defaults, or an explicit
/// override which always wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRoot {
    /// `$HOME/.config`
    Linux,
    /// `$HOME/Library/Application Support`
    MacOs,
    /// An explicit directory, usually from `CONFIG_DIR`.
    Override(PathBuf),
}

impl ConfigRoot {
    /// Choose the config-root strategy for `os`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnsupportedPlatform`] if `os` is neither Linux
    /// nor macOS and no override is given.
    pub fn select(os: &Os, override_dir: Option<&Path>) -> Result<Self, ManagerError> {
        if let Some(dir) = override_dir {
            return Ok(Self::Override(dir.to_path_buf()));
        }
        match os {
            Os::Linux => Ok(Self::Linux),
            Os::MacOs => Ok(Self::MacOs),
            Os::Other(name) => Err(ManagerError::UnsupportedPlatform(name.clone())),
        }
    }

    /// Resolve to an actual directory for the given home directory.
    #[must_use]
    pub fn resolve(&self, home: &Path) -> PathBuf {
        match self {
            Self::Linux => home.join(".config"),
            Self::MacOs => home.join("Library").join("Application Support"),
            Self::Override(dir) => dir.clone(),
        }
    }
}
