//! Symlink resource.
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState, backup};
use crate::error::EntryError;
use crate::operations::{FileSystemOps, NodeKind};
use crate::settings::normalize;

/// A symlink at `target` that should point to `source`.
///
/// Anything else found at `target` (a file, a directory, a dangling or
/// foreign link) is renamed to a backup before the link is created.
#[derive(Debug, Clone)]
pub struct SymlinkResource<'a> {
    /// The absolute source path in the repository (what the link points to).
    pub source: PathBuf,
    /// The absolute target path (where the link lives).
    pub target: PathBuf,
    fs: &'a dyn FileSystemOps,
    backup_stamp: &'a str,
}

impl<'a> SymlinkResource<'a> {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(
        source: PathBuf,
        target: PathBuf,
        fs: &'a dyn FileSystemOps,
        backup_stamp: &'a str,
    ) -> Self {
        Self {
            source,
            target,
            fs,
            backup_stamp,
        }
    }

    fn ensure_parent_dir(&self) -> Result<(), EntryError> {
        if let Some(parent) = self.target.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| EntryError::filesystem("create parent directory", parent, e))?;
        }
        Ok(())
    }

    fn link(&self) -> Result<(), EntryError> {
        self.ensure_parent_dir()?;
        self.fs
            .symlink(&self.source, &self.target)
            .map_err(|e| EntryError::filesystem("create link", &self.target, e))
    }
}

impl Resource for SymlinkResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState, EntryError> {
        let kind = self
            .fs
            .node_kind(&self.target)
            .map_err(|e| EntryError::filesystem("inspect", &self.target, e))?;

        match kind {
            None => Ok(ResourceState::Missing),
            Some(NodeKind::Symlink) => {
                let existing = self
                    .fs
                    .read_link(&self.target)
                    .map_err(|e| EntryError::filesystem("read link", &self.target, e))?;
                if points_to(&self.target, &existing, &self.source) {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("link to {}", existing.display()),
                    })
                }
            }
            Some(other) => Ok(ResourceState::Incorrect {
                current: other.as_str().to_string(),
            }),
        }
    }

    fn apply(&self, state: &ResourceState) -> Result<ResourceChange, EntryError> {
        match state {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Missing => {
                self.link()?;
                Ok(ResourceChange::Created)
            }
            ResourceState::Incorrect { .. } => {
                let backup = backup::next_free_path(self.fs, &self.target, self.backup_stamp)?;
                self.fs
                    .rename(&self.target, &backup)
                    .map_err(|e| EntryError::filesystem("back up", &self.target, e))?;

                // Put the original back if the link cannot be created.
                if let Err(link_error) = self.link() {
                    return Err(match self.fs.rename(&backup, &self.target) {
                        Ok(()) => link_error,
                        Err(source) => EntryError::BackupStranded {
                            target: self.target.clone(),
                            backup,
                            link_error: Box::new(link_error),
                            source,
                        },
                    });
                }
                Ok(ResourceChange::BackedUp { backup })
            }
        }
    }

    fn plan(&self, state: &ResourceState) -> Result<ResourceChange, EntryError> {
        match state {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Missing => Ok(ResourceChange::WouldCreate { backup: None }),
            ResourceState::Incorrect { .. } => Ok(ResourceChange::WouldCreate {
                backup: Some(backup::next_free_path(
                    self.fs,
                    &self.target,
                    self.backup_stamp,
                )?),
            }),
        }
    }
}

/// Whether the link at `link`, whose raw destination is `destination`,
/// resolves to `source`.
///
/// Relative destinations are resolved against the link's directory.  The
/// comparison is lexical; neither side is canonicalized.
fn points_to(link: &Path, destination: &Path, source: &Path) -> bool {
    let resolved = if destination.is_absolute() {
        destination.to_path_buf()
    } else {
        link.parent()
            .map_or_else(|| destination.to_path_buf(), |dir| dir.join(destination))
    };
    normalize(&resolved) == normalize(source)
}
