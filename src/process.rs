//! External process execution.
//!
//! [`ProcessRunner`] launches a command, drains stdout and stderr side by side,
//! decodes both streams with the [`charset`] sniffer and reports the exit code.

pub mod charset;
mod config;
mod error;
mod runner;

pub use charset::CharsetConfig;
pub use config::{RunnerConfig, DEFAULT_BUFFER_SIZE, DEFAULT_KILL_POLL_INTERVAL, DEFAULT_KILL_TIMEOUT};
pub use error::CommandFailure;
pub use runner::{ExecutionResult, ProcessRunner, EXIT_CODE_BEFORE_FINISHED, SIGNALLED_EXIT_CODE};
