//! The configuration mapping: logical entry names to source and target paths.
pub mod file;
pub mod template;

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, MappingError};
pub use template::TargetTemplate;

/// Whether an entry deploys a single file or a whole directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A single regular file.
    #[default]
    File,
    /// A directory, linked as a whole.
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// One logical configuration bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    /// Unique logical identifier.
    pub name: String,
    /// Path to the bundle relative to the repository root.
    pub source: PathBuf,
    /// Where the bundle is linked to; at least one.
    pub targets: Vec<TargetTemplate>,
    /// File or directory.
    pub kind: EntryKind,
}

impl ConfigEntry {
    /// Build an entry, parsing and validating its target templates.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the name is invalid, the source is not
    /// a relative path inside the repository, no targets are given, or a
    /// template does not parse.
    pub fn new<S: AsRef<str>>(
        name: &str,
        source: impl Into<PathBuf>,
        targets: &[S],
        kind: EntryKind,
    ) -> Result<Self, MappingError> {
        if name.is_empty() || name.contains(',') || name.chars().any(char::is_whitespace) {
            return Err(MappingError::InvalidName(name.to_string()));
        }
        let source = source.into();
        check_source(name, &source)?;
        if targets.is_empty() {
            return Err(MappingError::NoTargets(name.to_string()));
        }
        let targets = targets
            .iter()
            .map(|t| TargetTemplate::parse(name, t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            source,
            targets,
            kind,
        })
    }
}

/// A source must stay inside the repository root.
fn check_source(entry: &str, source: &Path) -> Result<(), MappingError> {
    let reason = if source.as_os_str().is_empty() {
        "path is empty"
    } else if source.has_root() || source.is_absolute() {
        "path must be relative to the repository root"
    } else if source.components().any(|c| c == Component::ParentDir) {
        "path must not contain '..'"
    } else {
        return Ok(());
    };
    Err(MappingError::InvalidSource {
        entry: entry.to_string(),
        path: source.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// Static description of a built-in entry.
struct BuiltinEntry {
    name: &'static str,
    source: &'static str,
    targets: &'static [&'static str],
    kind: EntryKind,
}

/// The built-in mapping, in processing order.
///
/// `nvim-plugins` and `nvim-no-plugins` are alternatives sharing a target;
/// selecting both is rejected before any change is made.
const BUILTIN: &[BuiltinEntry] = &[
    BuiltinEntry {
        name: "bashrc",
        source: "bashrc",
        targets: &["${HOME}/.bashrc"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "bash_aliases",
        source: "bash_aliases",
        targets: &["${HOME}/.bash_aliases"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "bash_env",
        source: "bash_env",
        targets: &["${HOME}/.bash_env"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "npmrc",
        source: "npmrc",
        targets: &["${HOME}/.npmrc"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "git",
        source: "git/config",
        targets: &["${HOME}/.gitconfig"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "tmux",
        source: "tmux/tmux.conf",
        targets: &["${HOME}/.tmux.conf"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "nvim-plugins",
        source: "nvim-plugins",
        targets: &["${CONFIG_DIR}/nvim"],
        kind: EntryKind::Directory,
    },
    BuiltinEntry {
        name: "nvim-no-plugins",
        source: "nvim-no-plugins",
        targets: &["${CONFIG_DIR}/nvim"],
        kind: EntryKind::Directory,
    },
    BuiltinEntry {
        name: "vscode",
        source: "vscode/settings.json",
        targets: &["${CONFIG_DIR}/Code/User/settings.json"],
        kind: EntryKind::File,
    },
    BuiltinEntry {
        name: "cursor",
        source: "cursor/settings.json",
        targets: &["${CONFIG_DIR}/Cursor/User/settings.json"],
        kind: EntryKind::File,
    },
];

/// Ordered, immutable collection of entries with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigMapping {
    entries: Vec<ConfigEntry>,
}

impl ConfigMapping {
    /// Build a mapping, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::DuplicateName`] on the first repeated name.
    pub fn new(entries: Vec<ConfigEntry>) -> Result<Self, MappingError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(MappingError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The mapping shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the built-in table is malformed.
    pub fn builtin() -> Result<Self, MappingError> {
        let entries = BUILTIN
            .iter()
            .map(|b| ConfigEntry::new(b.name, b.source, b.targets, b.kind))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// All entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether an entry called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a new mapping with the targets of the named entries replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnknownOverrideName`] for a name not in the
    /// mapping, or [`ManagerError::Mapping`] if a template does not parse.
    pub fn with_target_overrides(
        &self,
        overrides: &[TargetOverride],
    ) -> Result<Self, ManagerError> {
        let mut entries = self.entries.clone();
        for o in overrides {
            let entry = entries
                .iter_mut()
                .find(|e| e.name == o.name)
                .ok_or_else(|| ManagerError::UnknownOverrideName(o.name.clone()))?;
            entry.targets = vec![TargetTemplate::parse(&o.name, &o.target)?];
        }
        Ok(Self { entries })
    }
}

/// A `NAME=TARGET` replacement for an entry's targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOverride {
    /// Entry name.
    pub name: String,
    /// Replacement target template.
    pub target: String,
}

impl FromStr for TargetOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, target) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=TARGET, got '{s}'"))?;
        let name = name.trim();
        let target = target.trim();
        if name.is_empty() || target.is_empty() {
            return Err(format!("expected NAME=TARGET, got '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            target: target.to_string(),
        })
    }
}
