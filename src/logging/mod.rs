//! Console and run-log output.
//!
//! The manager talks to a [`Log`]; the binary installs a `tracing`
//! subscriber with [`init_subscriber`] and hands the manager a [`Logger`].
//! Tests use [`BufferedLog`].

mod buffered;
mod logger;
mod subscriber;
mod types;
mod utils;

pub use buffered::{BufferedLog, LogEntry};
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, LogKind};
pub use utils::log_file_path;

/// A [`Logger`] whose events go to a fresh run log in a temp directory
/// through a thread-local subscriber.  Keep the guard alive for the test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join("test.log");
    let layer = subscriber::FileLayer::open(&path).expect("open run log");
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG)),
    );
    let guard = tracing::dispatcher::set_default(&dispatch);
    (Logger::new(Some(path)), tmp, guard)
}
