//! The [`Log`] sink trait and the message kinds it carries.

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "dotlinks::stage";
/// Tracing target for dry-run actions.
pub(super) const DRY_RUN_TARGET: &str = "dotlinks::dry_run";

/// How a message is presented on the console and in the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Section header (`==> Linking`).
    Stage,
    /// Ordinary progress line.
    Info,
    /// Detail shown only with `--verbose`; always kept in the run log.
    Debug,
    /// Something the user should look at.
    Warn,
    /// A failure.
    Error,
    /// An action that would happen without `--dry-run`.
    DryRun,
}

impl LogKind {
    /// Emit `msg` as a `tracing` event of this kind.
    pub(super) fn emit(self, msg: &str) {
        match self {
            Self::Stage => tracing::info!(target: STAGE_TARGET, "{msg}"),
            Self::Info => tracing::info!("{msg}"),
            Self::Debug => tracing::debug!("{msg}"),
            Self::Warn => tracing::warn!("{msg}"),
            Self::Error => tracing::error!("{msg}"),
            Self::DryRun => tracing::info!(target: DRY_RUN_TARGET, "{msg}"),
        }
    }

    /// Recover the kind of a `tracing` event.  Events from other crates map
    /// onto their plain level.
    pub(super) fn of_event(level: tracing::Level, target: &str) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO if target == STAGE_TARGET => Self::Stage,
            tracing::Level::INFO if target == DRY_RUN_TARGET => Self::DryRun,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Where the symlink manager sends its messages.
///
/// Implementors only provide [`record`](Self::record); the named methods are
/// shorthands.  [`Logger`](super::Logger) forwards to `tracing`,
/// [`BufferedLog`](super::BufferedLog) keeps messages in memory.
pub trait Log: Send + Sync {
    /// Record one message.
    fn record(&self, kind: LogKind, msg: &str);

    /// Record a stage header.
    fn stage(&self, msg: &str) {
        self.record(LogKind::Stage, msg);
    }

    /// Record a progress line.
    fn info(&self, msg: &str) {
        self.record(LogKind::Info, msg);
    }

    /// Record a verbose-only detail.
    fn debug(&self, msg: &str) {
        self.record(LogKind::Debug, msg);
    }

    /// Record a warning.
    fn warn(&self, msg: &str) {
        self.record(LogKind::Warn, msg);
    }

    /// Record an error.
    fn error(&self, msg: &str) {
        self.record(LogKind::Error, msg);
    }

    /// Record a planned action.
    fn dry_run(&self, msg: &str) {
        self.record(LogKind::DryRun, msg);
    }
}
