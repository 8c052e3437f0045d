//! Runner configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use encoding_rs::Encoding;

use super::charset::CharsetConfig;

/// Default read buffer size for each output stream.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Interval between liveness checks after a kill request.
pub const DEFAULT_KILL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Total time a kill request waits to observe the process dying.
pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_millis(200);

/// Immutable configuration for a [`ProcessRunner`](super::ProcessRunner).
///
/// Every `with_*` method returns a modified copy, so a base configuration can
/// be shared and specialised per command without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    working_dir: Option<PathBuf>,
    stdout_buffer_size: usize,
    stderr_buffer_size: usize,
    charset: CharsetConfig,
    kill_poll_interval: Duration,
    kill_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            stdout_buffer_size: DEFAULT_BUFFER_SIZE,
            stderr_buffer_size: DEFAULT_BUFFER_SIZE,
            charset: CharsetConfig::default(),
            kill_poll_interval: DEFAULT_KILL_POLL_INTERVAL,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
        }
    }
}

impl RunnerConfig {
    /// Sets the working directory of the child process.
    pub fn with_working_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
            ..self
        }
    }

    /// Sets the encoding used when detection is off or inconclusive.
    pub fn with_output_charset(self, charset: &'static Encoding) -> Self {
        Self {
            charset: CharsetConfig {
                default_charset: charset,
                ..self.charset
            },
            ..self
        }
    }

    /// Turns charset auto-detection on or off.
    pub fn with_charset_auto_detect(self, auto_detect: bool) -> Self {
        Self {
            charset: CharsetConfig {
                auto_detect,
                ..self.charset
            },
            ..self
        }
    }

    /// Sets the maximum number of bytes inspected by charset detection.
    pub fn with_max_detection_sample(self, max_sample_size: usize) -> Self {
        Self {
            charset: CharsetConfig {
                max_sample_size,
                ..self.charset
            },
            ..self
        }
    }

    /// Sets the read buffer sizes for stdout and stderr.
    pub fn with_buffer_sizes(self, stdout: usize, stderr: usize) -> Self {
        Self {
            stdout_buffer_size: stdout,
            stderr_buffer_size: stderr,
            ..self
        }
    }

    /// Sets the kill polling interval and total timeout.
    pub fn with_kill_timing(self, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            kill_poll_interval: poll_interval,
            kill_timeout: timeout,
            ..self
        }
    }

    /// Working directory of the child process, if overridden.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Read buffer size for stdout.
    pub fn stdout_buffer_size(&self) -> usize {
        self.stdout_buffer_size.max(1)
    }

    /// Read buffer size for stderr.
    pub fn stderr_buffer_size(&self) -> usize {
        self.stderr_buffer_size.max(1)
    }

    /// Charset settings shared by both streams.
    pub fn charset(&self) -> &CharsetConfig {
        &self.charset
    }

    /// Interval between liveness checks after a kill request.
    pub fn kill_poll_interval(&self) -> Duration {
        self.kill_poll_interval
    }

    /// Total time a kill request waits to observe the process dying.
    pub fn kill_timeout(&self) -> Duration {
        self.kill_timeout
    }
}
