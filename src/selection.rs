//! Entry selection from `--all` / `--limit` / `--exclude`.
use std::collections::BTreeSet;

use crate::error::ManagerError;
use crate::mapping::{ConfigEntry, ConfigMapping};

/// Which entries are included before exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every entry in the mapping.
    All,
    /// Only the named entries.
    Only(BTreeSet<String>),
}

/// A selection minus a set of excluded names.
///
/// Names are matched against [`ConfigEntry::name`] only, never against
/// resolved paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFilter {
    selection: Selection,
    excluded: BTreeSet<String>,
}

/// Trim names and drop empty ones.
fn clean<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

impl SelectionFilter {
    /// Select every entry.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            selection: Selection::All,
            excluded: BTreeSet::new(),
        }
    }

    /// Select only the named entries.
    #[must_use]
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            selection: Selection::Only(clean(names)),
            excluded: BTreeSet::new(),
        }
    }

    /// Remove the named entries from the selection.
    ///
    /// Applies after `all`/`only`; names that are not in the mapping are
    /// ignored.
    #[must_use]
    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded.extend(clean(names));
        self
    }

    /// The inclusion part of the filter.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether `name` passes the filter.
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        if self.excluded.contains(name) {
            return false;
        }
        match &self.selection {
            Selection::All => true,
            Selection::Only(names) => names.contains(name),
        }
    }

    /// Check that every explicitly requested name exists in `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnknownSelectionName`] listing every unknown
    /// name.  Excluded names are never checked.
    pub fn validate(&self, mapping: &ConfigMapping) -> Result<(), ManagerError> {
        if let Selection::Only(names) = &self.selection {
            let unknown: Vec<String> = names
                .iter()
                .filter(|n| !mapping.contains(n))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(ManagerError::UnknownSelectionName(unknown));
            }
        }
        Ok(())
    }

    /// Validate and return the selected entries in mapping order.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn select<'m>(
        &self,
        mapping: &'m ConfigMapping,
    ) -> Result<Vec<&'m ConfigEntry>, ManagerError> {
        self.validate(mapping)?;
        Ok(mapping
            .entries()
            .iter()
            .filter(|e| self.includes(&e.name))
            .collect())
    }
}
