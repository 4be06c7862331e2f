//! Target path templates (`${CONFIG_DIR}/nvim`, `~/.bashrc`, …).
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MappingError;
use crate::settings::PathContext;

/// The directory a template is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Home,
    ConfigDir,
    Absolute,
}

/// A parsed target template.
///
/// Templates must start with `${HOME}`, `${CONFIG_DIR}`, `~` or `/`.
/// Variables are only recognised in that leading position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTemplate {
    raw: String,
    anchor: Anchor,
    rest: PathBuf,
}

impl TargetTemplate {
    /// Parse `raw` for the entry called `entry` (used in error messages).
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::UnknownVariable`] for an unrecognised
    /// `${NAME}` and [`MappingError::InvalidTarget`] for templates that are
    /// not anchored or contain a variable after the first component.
    pub fn parse(entry: &str, raw: &str) -> Result<Self, MappingError> {
        let invalid = |reason: &str| MappingError::InvalidTarget {
            entry: entry.to_string(),
            template: raw.to_string(),
            reason: reason.to_string(),
        };

        let (anchor, tail) = if let Some(after) = raw.strip_prefix("${") {
            let Some(end) = after.find('}') else {
                return Err(invalid("unterminated variable"));
            };
            let (name, tail) = after.split_at(end);
            let anchor = match name {
                "HOME" => Anchor::Home,
                "CONFIG_DIR" => Anchor::ConfigDir,
                other => {
                    return Err(MappingError::UnknownVariable {
                        entry: entry.to_string(),
                        variable: other.to_string(),
                    });
                }
            };
            (anchor, tail.strip_prefix('}').unwrap_or(tail))
        } else if raw == "~" || raw.starts_with("~/") {
            (Anchor::Home, raw.strip_prefix('~').unwrap_or(raw))
        } else if raw.starts_with('/') {
            (Anchor::Absolute, raw)
        } else {
            return Err(invalid("must start with ${HOME}, ${CONFIG_DIR}, ~ or /"));
        };

        if anchor != Anchor::Absolute && !tail.is_empty() && !tail.starts_with('/') {
            return Err(invalid("a variable must be followed by '/'"));
        }
        if tail.contains('$') {
            return Err(invalid("variables are only allowed at the start"));
        }

        let rest = if anchor == Anchor::Absolute {
            PathBuf::from(tail)
        } else {
            PathBuf::from(tail.trim_start_matches('/'))
        };

        Ok(Self {
            raw: raw.to_string(),
            anchor,
            rest,
        })
    }

    /// The template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Expand against the resolved directories.
    #[must_use]
    pub fn expand(&self, paths: &PathContext) -> PathBuf {
        let base: &Path = match self.anchor {
            Anchor::Home => &paths.home,
            Anchor::ConfigDir => &paths.config_dir,
            Anchor::Absolute => return self.rest.clone(),
        };
        if self.rest.as_os_str().is_empty() {
            base.to_path_buf()
        } else {
            base.join(&self.rest)
        }
    }
}

impl fmt::Display for TargetTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TargetTemplate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
