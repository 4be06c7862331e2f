//! Command-line entry point for dotlinks.
use std::process::ExitCode;

use clap::Parser;

use dotlinks::cli::Cli;
use dotlinks::commands::{self, ExitStatus};
use dotlinks::logging::{self, Log, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if let Some(shell) = args.completions {
        commands::completions::run(shell);
        return ExitCode::SUCCESS;
    }

    // Help output must not truncate the log of the last real run.
    let log_file = args
        .selection_filter()
        .and_then(|_| logging::log_file_path("apply"));
    logging::init_subscriber(args.verbose, log_file.as_deref());
    let log = Logger::new(log_file);

    match commands::run(&args, &log) {
        Ok(status) => status.into(),
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitStatus::Fatal.into()
        }
    }
}
