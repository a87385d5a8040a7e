use std::process::ExitCode;

use wzreplay_core::logging;

mod cli;

use crate::cli::Cli;

fn main() -> ExitCode {
    // Initialize logging as early as possible; the log file is the user's only diagnostic.
    let log_file = match logging::init_logging() {
        Ok(path) => Some(path),
        Err(err) => {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable, using stderr: {:#}", err);
            None
        }
    };

    ExitCode::from(Cli::run_from_args(log_file.as_deref()))
}
