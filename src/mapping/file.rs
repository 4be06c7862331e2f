//! Mapping files in TOML.
//!
//! ```toml
//! [[entry]]
//! name = "git"
//! source = "git/config"
//! target = "${HOME}/.gitconfig"
//!
//! [[entry]]
//! name = "nvim"
//! source = "nvim"
//! target = ["${CONFIG_DIR}/nvim", "${HOME}/.vim"]
//! kind = "directory"
//! ```
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{ConfigEntry, ConfigMapping, EntryKind};
use crate::error::MappingError;

/// One or many target templates.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TargetSpec {
    /// `target = "~/.bashrc"`
    One(String),
    /// `target = ["~/.a", "~/.b"]`
    Many(Vec<String>),
}

impl TargetSpec {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(t) => vec![t],
            Self::Many(ts) => ts,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryRecord {
    name: String,
    source: PathBuf,
    target: TargetSpec,
    #[serde(default)]
    kind: EntryKind,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingFile {
    #[serde(default, rename = "entry")]
    entries: Vec<EntryRecord>,
}

/// Load a mapping from a TOML file.
///
/// # Errors
///
/// Returns [`MappingError::Io`] if the file cannot be read, and any parse or
/// validation error from [`parse`].
pub fn load(path: &Path) -> Result<ConfigMapping, MappingError> {
    let content = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

/// Parse mapping TOML.  `origin` is only used in error messages.
///
/// # Errors
///
/// Returns [`MappingError::Parse`] for malformed TOML or unknown fields, and
/// the validation errors of [`ConfigEntry::new`] and [`ConfigMapping::new`].
pub fn parse(content: &str, origin: &Path) -> Result<ConfigMapping, MappingError> {
    let file: MappingFile = toml::from_str(content).map_err(|source| MappingError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let entries = file
        .entries
        .into_iter()
        .map(|r| {
            let targets = r.target.into_vec();
            ConfigEntry::new(&r.name, r.source, targets.as_slice(), r.kind)
        })
        .collect::<Result<Vec<_>, _>>()?;
    ConfigMapping::new(entries)
}
