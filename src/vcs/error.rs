//! Errors produced while reading VCS history.

use thiserror::Error;

use crate::process::CommandFailure;

/// Tool output that does not follow the expected log format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A commit block did not split into the expected number of fields.
    #[error("Expected {expected} fields in commit block but found {actual}: {block}")]
    FieldCount {
        /// Field count the format produces.
        expected: usize,
        /// Field count actually found.
        actual: usize,
        /// Shortened copy of the offending block.
        block: String,
    },

    /// The commit timestamp was not an epoch-seconds value.
    #[error("Invalid commit timestamp '{0}'")]
    Timestamp(String),

    /// A change line started with an unknown status.
    #[error("Unknown change type '{0}'")]
    ChangeType(String),

    /// A change line had no file path.
    #[error("Malformed change line '{0}'")]
    ChangeLine(String),
}

/// Anything that stops a VCS command from producing a result.
#[derive(Error, Debug, Clone)]
pub enum LogError {
    /// The tool could not be run to completion.
    #[error(transparent)]
    Command(#[from] CommandFailure),

    /// The tool's output could not be understood.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The tool exited with an error.
    #[error("VCS command failed: {0}")]
    Vcs(String),

    /// The operation has no implementation for this VCS.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}
