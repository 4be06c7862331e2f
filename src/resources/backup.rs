//! Backup naming for targets that are moved aside.
//!
//! A pre-existing target `~/.bashrc` becomes
//! `~/.bashrc.backup.20261018T091500` in the same directory; if that name is
//! taken, `.1`, `.2`, … is appended.  Backups are never removed.
use std::ffi::OsString;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::EntryError;
use crate::operations::FileSystemOps;

/// Give up looking for a free backup name after this many attempts.
const MAX_ATTEMPTS: u32 = 1000;

/// Format `time` as a backup stamp (`YYYYMMDDTHHMMSS`).
#[must_use]
pub fn stamp_at<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%Y%m%dT%H%M%S").to_string()
}

/// Backup stamp for the current local time.
#[must_use]
pub fn current_stamp() -> String {
    stamp_at(&chrono::Local::now())
}

/// The backup path for `target` with the given stamp and attempt number.
///
/// Attempt `0` has no numeric suffix.
#[must_use]
pub fn backup_path(target: &Path, stamp: &str, attempt: u32) -> PathBuf {
    let mut name = target
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(format!(".backup.{stamp}"));
    if attempt > 0 {
        name.push(format!(".{attempt}"));
    }
    target.with_file_name(name)
}

/// First backup path for `target` that does not exist yet.
///
/// # Errors
///
/// Returns [`EntryError::Filesystem`] if a candidate cannot be inspected or
/// every candidate is taken.
pub fn next_free_path(
    fs: &dyn FileSystemOps,
    target: &Path,
    stamp: &str,
) -> Result<PathBuf, EntryError> {
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = backup_path(target, stamp, attempt);
        let existing = fs
            .node_kind(&candidate)
            .map_err(|e| EntryError::filesystem("inspect backup", &candidate, e))?;
        if existing.is_none() {
            return Ok(candidate);
        }
    }
    Err(EntryError::filesystem(
        "find free backup name for",
        target,
        std::io::Error::from(std::io::ErrorKind::AlreadyExists),
    ))
}
