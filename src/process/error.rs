//! Process execution failures.

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Reasons a command could not be run to completion.
///
/// A non-zero exit code is not a failure; it is reported through
/// [`ExecutionResult::exit_code`](super::ExecutionResult::exit_code).
#[derive(Error, Debug, Clone)]
pub enum CommandFailure {
    /// The command line was empty.
    #[error("Cannot run an empty command")]
    EmptyCommand,

    /// The child process could not be started.
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        /// Rendered command line.
        command: String,
        /// Underlying OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Reading one of the output streams failed.
    #[error("Failed to read {stream} of '{command}': {source}")]
    Read {
        /// Rendered command line.
        command: String,
        /// Stream name, `stdout` or `stderr`.
        stream: &'static str,
        /// Underlying OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A reader thread could not be started or did not finish normally.
    #[error("Reader thread for {stream} of '{command}' failed")]
    Reader {
        /// Rendered command line.
        command: String,
        /// Stream name, `stdout` or `stderr`.
        stream: &'static str,
    },

    /// Waiting for the process to exit failed.
    #[error("Failed waiting for '{command}' to exit: {source}")]
    Wait {
        /// Rendered command line.
        command: String,
        /// Underlying OS error.
        #[source]
        source: Arc<io::Error>,
    },
}
