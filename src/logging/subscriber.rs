//! Console formatting and the run-log layer.
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::types::LogKind;
use super::utils::{strip_ansi, utc_now};

/// Collects the `message` field of an event.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.clear();
            let _ = write!(self.0, "{value:?}");
        }
    }
}

fn classify(event: &tracing::Event<'_>) -> (LogKind, String) {
    let meta = event.metadata();
    let mut message = Message::default();
    event.record(&mut message);
    (LogKind::of_event(*meta.level(), meta.target()), message.0)
}

/// Appends every event, `DEBUG` included, to the run log as plain text.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Truncate `path`, write the run header and keep the file open for
    /// appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub(super) fn open(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        writeln!(
            file,
            "# dotlinks {} run started {} UTC",
            crate::VERSION,
            utc_now("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

/// One run-log line: time, fixed-width tag, message.
fn file_line(kind: LogKind, time: &str, msg: &str) -> String {
    let tag = match kind {
        LogKind::Stage => "==>",
        LogKind::Info => "",
        LogKind::Debug => "debug",
        LogKind::Warn => "warn",
        LogKind::Error => "error",
        LogKind::DryRun => "dry-run",
    };
    format!("{time} {tag:<7} {msg}").trim_end().to_string()
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let (kind, msg) = classify(event);
        let line = file_line(kind, &utc_now("%H:%M:%S"), &strip_ansi(&msg));
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Console output: bold stage headers, indented progress, coloured
/// warnings and errors.
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let (kind, msg) = classify(event);
        match kind {
            LogKind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            LogKind::Info => writeln!(writer, "  {msg}"),
            LogKind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
            LogKind::DryRun => writeln!(writer, "  \x1b[36m[DRY RUN]\x1b[0m {msg}"),
            LogKind::Warn => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            LogKind::Error => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
        }
    }
}

/// Install the global subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; debug lines
/// reach the console only when `verbose`.  When `log_file` is given and can
/// be opened, every event is also appended there.  Call once, before any
/// logging.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(io::stdout.with_min_level(tracing::Level::INFO));
    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(writer)
        .with_filter(console_level);

    let file = log_file
        .and_then(|path| FileLayer::open(path).ok())
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
