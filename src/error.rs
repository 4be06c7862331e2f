//! Domain-specific error types for the symlink manager.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Fatal errors ([`ManagerError`], [`MappingError`]) abort a run before any
//! filesystem mutation.  Per-entry errors ([`EntryError`]) are recorded in the
//! apply report and never stop the remaining entries.  Command handlers at the
//! CLI boundary convert fatal errors to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! ManagerError                fatal, exit code 2
//! ├── UnsupportedPlatform     no config root for this OS
//! ├── UnknownSelectionName    --limit names not in the mapping
//! ├── UnknownOverrideName     --map names not in the mapping
//! ├── DuplicateTarget         two selected entries share a target
//! ├── MissingHome             HOME is not set
//! └── Mapping(MappingError)   invalid mapping table or file
//!
//! EntryError                  per entry, exit code 1
//! ├── MissingSource
//! ├── KindMismatch
//! ├── Filesystem
//! └── BackupStranded          link and restore both failed
//! ```

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::mapping::EntryKind;

/// Errors that abort a run before any filesystem mutation.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The host OS has no known config-root convention and no override was given.
    #[error("Unsupported platform '{0}': set CONFIG_DIR to choose a config root")]
    UnsupportedPlatform(String),

    /// One or more `--limit` names are not declared in the mapping.
    #[error("Unknown entry name(s): {}", .0.join(", "))]
    UnknownSelectionName(Vec<String>),

    /// A `--map` override names an entry that is not declared in the mapping.
    #[error("Unknown entry name in target override: {0}")]
    UnknownOverrideName(String),

    /// Two selected entries resolve to the same target path.
    #[error("Duplicate target path {} is targeted by: {}", .path.display(), .names.join(", "))]
    DuplicateTarget {
        /// The shared target path.
        path: PathBuf,
        /// Names of the entries that resolve to it, in mapping order.
        names: Vec<String>,
    },

    /// The home directory could not be determined.
    #[error("HOME environment variable is not set")]
    MissingHome,

    /// The mapping table or mapping file is invalid.
    #[error("Invalid mapping: {0}")]
    Mapping(#[from] MappingError),
}

/// Errors that arise while constructing a [`ConfigMapping`](crate::mapping::ConfigMapping).
#[derive(Error, Debug)]
pub enum MappingError {
    /// Two entries declare the same name.
    #[error("duplicate entry name '{0}'")]
    DuplicateName(String),

    /// An entry name is empty or contains a separator character.
    #[error("invalid entry name '{0}': names must be non-empty without commas or whitespace")]
    InvalidName(String),

    /// An entry declares no target paths.
    #[error("entry '{0}' declares no targets")]
    NoTargets(String),

    /// A target template references a variable that is not defined.
    #[error("entry '{entry}': unknown variable '{variable}' in target template")]
    UnknownVariable {
        /// Name of the entry holding the template.
        entry: String,
        /// The unrecognised variable name.
        variable: String,
    },

    /// A target template is not anchored at a known root.
    #[error("entry '{entry}': invalid target '{template}': {reason}")]
    InvalidTarget {
        /// Name of the entry holding the template.
        entry: String,
        /// The raw template text.
        template: String,
        /// Why the template was rejected.
        reason: String,
    },

    /// An entry source escapes the repository root.
    #[error("entry '{entry}': invalid source '{}': {reason}", .path.display())]
    InvalidSource {
        /// Name of the entry.
        entry: String,
        /// The source as declared.
        path: PathBuf,
        /// Why the source was rejected.
        reason: String,
    },

    /// A mapping file could not be read.
    #[error("IO error reading mapping file {}: {source}", .path.display())]
    Io {
        /// Path to the mapping file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A mapping file is not valid TOML or does not match the schema.
    #[error("Invalid TOML in mapping file {}: {source}", .path.display())]
    Parse {
        /// Path to the mapping file.
        path: PathBuf,
        /// Underlying deserialisation error.
        source: toml::de::Error,
    },
}

/// Errors recorded against a single entry or target during `apply`.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The entry's source path does not exist in the repository.
    #[error("source does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    /// The source exists but is not the declared kind.
    #[error("source {} is a {actual}, expected a {expected}", .path.display())]
    KindMismatch {
        /// The resolved source path.
        path: PathBuf,
        /// Kind declared by the mapping.
        expected: EntryKind,
        /// Kind found on disk.
        actual: String,
    },

    /// A filesystem operation failed.
    #[error("{operation} {}: {source}", .path.display())]
    Filesystem {
        /// Short verb describing the failed operation.
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Linking failed after the occupant was moved aside, and moving it back
    /// failed too.  The occupant now lives only at `backup`.
    #[error(
        "{link_error}; restoring {} also failed ({source}), original content is at {}",
        .target.display(),
        .backup.display()
    )]
    BackupStranded {
        /// Where the link should have been created.
        target: PathBuf,
        /// Where the previous occupant was moved to.
        backup: PathBuf,
        /// Why the link could not be created.
        link_error: Box<Self>,
        /// Why the restoring rename failed.
        source: std::io::Error,
    },
}

impl EntryError {
    /// Wrap an I/O error with the operation and path it came from.
    #[must_use]
    pub fn filesystem(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Classification used by the apply report.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MissingSource(_) => FailureKind::MissingSource,
            Self::KindMismatch { .. } => FailureKind::KindMismatch,
            Self::Filesystem { .. } | Self::BackupStranded { .. } => FailureKind::Filesystem,
        }
    }
}

/// Serializable classification of an [`EntryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// See [`EntryError::MissingSource`].
    MissingSource,
    /// See [`EntryError::KindMismatch`].
    KindMismatch,
    /// See [`EntryError::Filesystem`] and [`EntryError::BackupStranded`].
    Filesystem,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ManagerError
    // -----------------------------------------------------------------------

    #[test]
    fn unsupported_platform_display() {
        let e = ManagerError::UnsupportedPlatform("windows".to_string());
        assert_eq!(
            e.to_string(),
            "Unsupported platform 'windows': set CONFIG_DIR to choose a config root"
        );
    }

    #[test]
    fn unknown_selection_name_lists_all_names() {
        let e = ManagerError::UnknownSelectionName(vec!["foo".to_string(), "bar".to_string()]);
        assert_eq!(e.to_string(), "Unknown entry name(s): foo, bar");
    }

    #[test]
    fn duplicate_target_display() {
        let e = ManagerError::DuplicateTarget {
            path: PathBuf::from("/home/user/.config/nvim"),
            names: vec!["nvim-plugins".to_string(), "nvim-no-plugins".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "Duplicate target path /home/user/.config/nvim is targeted by: nvim-plugins, nvim-no-plugins"
        );
    }

    #[test]
    fn manager_error_from_mapping_error() {
        let e: ManagerError = MappingError::DuplicateName("git".to_string()).into();
        assert_eq!(e.to_string(), "Invalid mapping: duplicate entry name 'git'");
    }

    // -----------------------------------------------------------------------
    // MappingError
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_variable_display() {
        let e = MappingError::UnknownVariable {
            entry: "tmux".to_string(),
            variable: "XDG_HOME".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "entry 'tmux': unknown variable 'XDG_HOME' in target template"
        );
    }

    #[test]
    fn mapping_io_has_source() {
        use std::error::Error as StdError;
        let e = MappingError::Io {
            path: PathBuf::from("/repo/dotlinks.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/repo/dotlinks.toml"));
    }

    // -----------------------------------------------------------------------
    // EntryError
    // -----------------------------------------------------------------------

    #[test]
    fn missing_source_display_and_kind() {
        let e = EntryError::MissingSource(PathBuf::from("/repo/bashrc"));
        assert_eq!(e.to_string(), "source does not exist: /repo/bashrc");
        assert_eq!(e.kind(), FailureKind::MissingSource);
    }

    #[test]
    fn kind_mismatch_display() {
        let e = EntryError::KindMismatch {
            path: PathBuf::from("/repo/nvim"),
            expected: EntryKind::Directory,
            actual: "file".to_string(),
        };
        assert_eq!(e.to_string(), "source /repo/nvim is a file, expected a directory");
        assert_eq!(e.kind(), FailureKind::KindMismatch);
    }

    #[test]
    fn filesystem_display_includes_operation_and_cause() {
        let e = EntryError::filesystem(
            "rename",
            "/home/user/.bashrc",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert_eq!(e.to_string(), "rename /home/user/.bashrc: permission denied");
        assert_eq!(e.kind(), FailureKind::Filesystem);
    }

    #[test]
    fn backup_stranded_names_the_backup() {
        let e = EntryError::BackupStranded {
            target: PathBuf::from("/h/.bashrc"),
            backup: PathBuf::from("/h/.bashrc.backup.20261018T091500"),
            link_error: Box::new(EntryError::filesystem(
                "create link",
                "/h/.bashrc",
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(
            e.to_string(),
            "create link /h/.bashrc: permission denied; restoring /h/.bashrc also failed \
             (permission denied), original content is at /h/.bashrc.backup.20261018T091500"
        );
        assert_eq!(e.kind(), FailureKind::Filesystem);
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::MissingSource).expect("serialize");
        assert_eq!(json, "\"missing_source\"");
    }

    // -----------------------------------------------------------------------
    // Send + Sync bounds
    // -----------------------------------------------------------------------

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ManagerError>();
        assert_send_sync::<MappingError>();
        assert_send_sync::<EntryError>();
    }

    #[test]
    fn manager_error_converts_to_anyhow() {
        let e = ManagerError::MissingHome;
        let _anyhow_err: anyhow::Error = e.into();
    }
}
