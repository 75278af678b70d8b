use urlsum_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; stdout is reserved for results.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable ({:#}), logging to stderr", err);
    }

    if let Err(err) = Cli::run_from_args() {
        eprintln!("urlsum error: {:#}", err);
        std::process::exit(1);
    }
}
