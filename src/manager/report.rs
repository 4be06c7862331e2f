//! Structured result of an apply run.
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{EntryError, FailureKind};
use crate::resources::ResourceChange;

/// Why an entry or target failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Error classification.
    pub kind: FailureKind,
    /// Human-readable cause, including the path involved.
    pub reason: String,
}

impl From<&EntryError> for Failure {
    fn from(err: &EntryError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

/// What happened to one target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// Already a link to the source; nothing was touched.
    Unchanged,
    /// A link was created at a previously empty path.
    Created,
    /// The previous occupant was moved to `backup` and a link created.
    BackedUp {
        /// Where the previous occupant now lives.
        backup: PathBuf,
    },
    /// Dry run: a link would be created, after a backup if `backup` is set.
    WouldCreate {
        /// Planned backup location.
        #[serde(skip_serializing_if = "Option::is_none")]
        backup: Option<PathBuf>,
    },
    /// The target could not be converged.
    Failed(Failure),
}

impl From<ResourceChange> for TargetOutcome {
    fn from(change: ResourceChange) -> Self {
        match change {
            ResourceChange::AlreadyCorrect => Self::Unchanged,
            ResourceChange::Created => Self::Created,
            ResourceChange::BackedUp { backup } => Self::BackedUp { backup },
            ResourceChange::WouldCreate { backup } => Self::WouldCreate { backup },
        }
    }
}

/// Outcome for one target path of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// The resolved absolute target path.
    pub path: PathBuf,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

/// Overall status of an entry, derived from its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Every target was already correct.
    Unchanged,
    /// At least one link was created and none needed a backup.
    Created,
    /// At least one occupant was backed up before linking.
    BackedUp,
    /// Dry run with at least one pending change.
    WouldCreate,
    /// The source was unusable or at least one target failed.
    Failed,
}

impl EntryStatus {
    /// Short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Created => "created",
            Self::BackedUp => "backed up",
            Self::WouldCreate => "would create",
            Self::Failed => "failed",
        }
    }
}

/// Outcome for one selected entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    /// Entry name.
    pub name: String,
    /// The resolved absolute source path.
    pub source: PathBuf,
    /// Derived overall status.
    pub status: EntryStatus,
    /// Entry-level failure (unusable source); targets are then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    /// Per-target outcomes, in declaration order.
    pub targets: Vec<TargetReport>,
}

impl EntryReport {
    /// Report for an entry whose targets were processed.
    #[must_use]
    pub fn with_targets(name: &str, source: PathBuf, targets: Vec<TargetReport>) -> Self {
        let status = derive_status(&targets);
        Self {
            name: name.to_string(),
            source,
            status,
            failure: None,
            targets,
        }
    }

    /// Report for an entry whose source could not be used.
    #[must_use]
    pub fn source_failed(name: &str, source: PathBuf, err: &EntryError) -> Self {
        Self {
            name: name.to_string(),
            source,
            status: EntryStatus::Failed,
            failure: Some(Failure::from(err)),
            targets: Vec::new(),
        }
    }

    /// Whether the entry or any of its targets failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == EntryStatus::Failed
    }

    /// Every failure reason recorded for this entry.
    #[must_use]
    pub fn failure_reasons(&self) -> Vec<&str> {
        self.failure
            .iter()
            .map(|f| f.reason.as_str())
            .chain(self.targets.iter().filter_map(|t| match &t.outcome {
                TargetOutcome::Failed(f) => Some(f.reason.as_str()),
                _ => None,
            }))
            .collect()
    }
}

fn derive_status(targets: &[TargetReport]) -> EntryStatus {
    let outcomes = || targets.iter().map(|t| &t.outcome);
    if outcomes().any(|o| matches!(o, TargetOutcome::Failed(_))) {
        EntryStatus::Failed
    } else if outcomes().any(|o| matches!(o, TargetOutcome::WouldCreate { .. })) {
        EntryStatus::WouldCreate
    } else if outcomes().any(|o| matches!(o, TargetOutcome::BackedUp { .. })) {
        EntryStatus::BackedUp
    } else if outcomes().any(|o| matches!(o, TargetOutcome::Created)) {
        EntryStatus::Created
    } else {
        EntryStatus::Unchanged
    }
}

/// Aggregate per-target counts.
///
/// `created` counts every link made, including those preceded by a backup;
/// `backed_up` counts the backups alone.  An entry whose source is unusable
/// adds one to `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    /// Targets already correct.
    pub unchanged: usize,
    /// Links created.
    pub created: usize,
    /// Pre-existing targets moved to a backup.
    pub backed_up: usize,
    /// Dry-run targets that would change.
    pub would_create: usize,
    /// Failed targets plus entries with an unusable source.
    pub failed: usize,
}

/// Result of one apply run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Whether the run stopped early on an interrupt.
    pub interrupted: bool,
    /// Per-entry reports, in mapping order.
    pub entries: Vec<EntryReport>,
    /// Aggregate counts, kept in sync by [`push`](Self::push).
    pub counts: ReportCounts,
}

impl ApplyReport {
    /// Create an empty report.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Append an entry report and update the counts.
    pub fn push(&mut self, entry: EntryReport) {
        if entry.failure.is_some() {
            self.counts.failed += 1;
        }
        for target in &entry.targets {
            match target.outcome {
                TargetOutcome::Unchanged => self.counts.unchanged += 1,
                TargetOutcome::Created => self.counts.created += 1,
                TargetOutcome::BackedUp { .. } => {
                    self.counts.backed_up += 1;
                    self.counts.created += 1;
                }
                TargetOutcome::WouldCreate { .. } => self.counts.would_create += 1,
                TargetOutcome::Failed(_) => self.counts.failed += 1,
            }
        }
        self.entries.push(entry);
    }

    /// Whether any entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(EntryReport::is_failed)
    }

    /// The report for entry `name`, if it was processed.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&EntryReport> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Pretty-printed JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
