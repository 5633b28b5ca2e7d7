use emlr_core::logging;
use std::process::ExitCode;

mod cli;

use crate::cli::CliCommand;

fn main() -> ExitCode {
    // Log to the state dir when possible; the CLI must still run without it.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    match CliCommand::run_from_args() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("emlr error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
