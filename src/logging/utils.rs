//! Run-log location, ANSI stripping and timestamps.
use std::ffi::OsString;
use std::path::PathBuf;

/// Remove terminal escape sequences so the run log stays plain text.
///
/// A CSI sequence (`ESC [` ... final byte in `@`..=`~`) is dropped whole;
/// any other `ESC x` pair is dropped as two characters.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'[').is_some() {
            let _ = chars.by_ref().find(|b| ('@'..='~').contains(b));
        } else {
            chars.next();
        }
    }
    out
}

/// Directory holding run logs: `$XDG_CACHE_HOME/dotlinks`, else
/// `$HOME/.cache/dotlinks`, else `./.cache/dotlinks`.
pub(super) fn log_dir(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let cache = xdg_cache_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.filter(|v| !v.is_empty()).map(|h| PathBuf::from(h).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"));
    cache.join("dotlinks")
}

/// Path of the run log for `command`, creating its directory.
///
/// Returns `None` when the directory cannot be created; logging then stays
/// console-only.
#[must_use]
pub fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = log_dir(
        std::env::var_os("XDG_CACHE_HOME"),
        std::env::var_os("HOME"),
    );
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
