//! Idempotent filesystem resources: inspect, then converge.
pub mod backup;
pub mod symlink;

use std::path::PathBuf;

use crate::error::EntryError;

/// What currently occupies a resource's path.
///
/// ```
/// use dotlinks::resources::ResourceState;
///
/// let foreign = ResourceState::Incorrect { current: "file".into() };
/// assert_ne!(foreign, ResourceState::Missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// The path is free.
    Missing,
    /// Already in the desired state.
    Correct,
    /// Occupied by something else.
    Incorrect {
        /// Short description of the occupant (`file`, `symlink to /x`, ...).
        current: String,
    },
}

/// What converging a resource did, or would do under dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Nothing to do.
    AlreadyCorrect,
    /// Created at a free path.
    Created,
    /// The occupant was renamed to `backup`, then the resource was created.
    BackedUp {
        /// New location of the previous occupant.
        backup: PathBuf,
    },
    /// Dry run only.
    WouldCreate {
        /// Where the occupant would be renamed to, if there is one.
        backup: Option<PathBuf>,
    },
}

/// A single path the manager wants in a particular state.
pub trait Resource {
    /// Human-readable description, used in log lines.
    fn description(&self) -> String;

    /// Inspect the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be inspected.
    fn current_state(&self) -> Result<ResourceState, EntryError>;

    /// Move from `state` to the desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if a filesystem operation fails.
    fn apply(&self, state: &ResourceState) -> Result<ResourceChange, EntryError>;

    /// Report what [`apply`](Self::apply) would do from `state`; read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if a read-only query fails.
    fn plan(&self, state: &ResourceState) -> Result<ResourceChange, EntryError>;

    /// Inspect, then apply (or only plan when `dry_run`).
    ///
    /// # Errors
    ///
    /// Propagates errors from the inspection and from apply or plan.
    fn converge(&self, dry_run: bool) -> Result<ResourceChange, EntryError> {
        let state = self.current_state()?;
        if dry_run {
            self.plan(&state)
        } else {
            self.apply(&state)
        }
    }
}
