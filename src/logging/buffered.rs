//! In-memory [`Log`] sink.
use std::sync::Mutex;

use super::types::{Log, LogKind};

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// How the message was logged.
    pub kind: LogKind,
    /// Message text.
    pub message: String,
}

impl LogEntry {
    /// Build an entry.
    #[must_use]
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Captures messages instead of emitting them, so callers can inspect what
/// the manager reported and [`flush`](Self::flush) it later.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Copy of the captured entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Whether any captured message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .is_ok_and(|entries| entries.iter().any(|e| e.message.contains(needle)))
    }

    /// Emit every captured entry through `tracing`, then empty the buffer.
    pub fn flush(&self) {
        let drained = self
            .entries
            .lock()
            .map(|mut entries| std::mem::take(&mut *entries))
            .unwrap_or_default();
        for entry in drained {
            entry.kind.emit(&entry.message);
        }
    }
}

impl Log for BufferedLog {
    fn record(&self, kind: LogKind, msg: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry::new(kind, msg));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;

    #[test]
    fn keeps_kind_and_order() {
        let log = BufferedLog::new();
        log.stage("Linking");
        log.info("git: linked");
        log.dry_run("tmux: would link");
        log.error("npmrc: source does not exist");

        assert_eq!(
            log.entries(),
            vec![
                LogEntry::new(LogKind::Stage, "Linking"),
                LogEntry::new(LogKind::Info, "git: linked"),
                LogEntry::new(LogKind::DryRun, "tmux: would link"),
                LogEntry::new(LogKind::Error, "npmrc: source does not exist"),
            ]
        );
    }

    #[test]
    fn contains_matches_substrings() {
        let log = BufferedLog::new();
        log.warn("interrupted before git");
        assert!(log.contains("before git"));
        assert!(!log.contains("tmux"));
    }

    #[test]
    fn usable_as_trait_object() {
        let log = BufferedLog::new();
        let sink: &dyn Log = &log;
        sink.debug("git: source /r/git/config");
        assert_eq!(log.entries()[0].kind, LogKind::Debug);
    }

    #[test]
    fn flush_reaches_run_log_and_empties_buffer() {
        let (logger, _tmp, _guard) = isolated_logger();
        let log = BufferedLog::new();
        log.dry_run("bashrc: would link");
        log.flush();

        assert!(log.entries().is_empty());
        let contents = std::fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(contents.contains("dry-run bashrc: would link"));
    }
}
