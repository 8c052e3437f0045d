//! Child process execution with concurrent output draining.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use tracing::{debug, warn};

use super::charset::{self, CharsetConfig};
use super::config::RunnerConfig;
use super::error::CommandFailure;

/// Exit code reported before the process has finished (or when it never ran).
pub const EXIT_CODE_BEFORE_FINISHED: i32 = i32::MIN;

/// Exit code reported for a child terminated by a signal.
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Outcome of one [`ProcessRunner::execute`] call.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
    /// Exit code, or [`EXIT_CODE_BEFORE_FINISHED`] if the process never completed.
    pub exit_code: i32,
    /// Why the command could not be run to completion, if it could not.
    pub failure: Option<CommandFailure>,
}

impl ExecutionResult {
    fn failed(failure: CommandFailure) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: EXIT_CODE_BEFORE_FINISHED,
            failure: Some(failure),
        }
    }

    /// Returns true if the process ran to completion and exited with 0.
    pub fn is_successful(&self) -> bool {
        self.failure.is_none() && self.exit_code == 0
    }
}

/// Runs an external command and collects its decoded output.
///
/// The runner owns the child process for the duration of [`execute`](Self::execute).
/// Concurrent `execute` calls on one runner run one after the other. Another
/// thread holding a reference may call [`kill`](Self::kill) at any time.
pub struct ProcessRunner {
    command: Vec<String>,
    environment: HashMap<String, String>,
    config: RunnerConfig,
    // Held for a whole execution; `child` stays separately lockable for `kill`.
    execution: Mutex<()>,
    child: Mutex<Option<Child>>,
}

impl ProcessRunner {
    /// Creates a runner for the given program and arguments.
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            environment: HashMap::new(),
            config: RunnerConfig::default(),
            execution: Mutex::new(()),
            child: Mutex::new(None),
        }
    }

    /// Adds environment overrides on top of the inherited environment.
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Replaces the runner configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Program and arguments.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Active configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs the command to completion.
    ///
    /// Launch, read and wait failures are reported in
    /// [`ExecutionResult::failure`]; this method itself never fails.
    pub fn execute(&self) -> ExecutionResult {
        let started = Instant::now();
        debug!(command = %self.describe(), "Running command");

        let _execution = self.execution.lock().unwrap_or_else(|e| e.into_inner());
        let result = self.run().unwrap_or_else(|failure| {
            warn!(error = %failure, "Command did not complete");
            ExecutionResult::failed(failure)
        });

        debug!(
            exit_code = result.exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    /// Requests termination of the running process.
    ///
    /// Returns true if no process is running or it was observed dead within
    /// the configured kill timeout, false if it still appeared alive.
    pub fn kill(&self) -> bool {
        let mut guard = self.lock_child();
        let Some(child) = guard.as_mut() else {
            return true;
        };
        if let Ok(Some(_)) = child.try_wait() {
            return true;
        }

        if let Err(e) = child.kill() {
            debug!(error = %e, "Kill request failed");
        }

        let deadline = Instant::now() + self.config.kill_timeout();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "Failed to poll killed process");
                    return false;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(self.config.kill_poll_interval());
        }
    }

    /// Returns true while a child process is alive.
    pub fn is_running(&self) -> bool {
        self.lock_child()
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Renders the command line and working directory for diagnostics.
    ///
    /// Environment values are never included.
    pub fn describe(&self) -> String {
        let mut description = self.command.join(" ");
        if let Some(dir) = self.config.working_dir() {
            description.push_str(&format!(" (working directory '{}')", dir.display()));
        }
        description
    }

    fn run(&self) -> Result<ExecutionResult, CommandFailure> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(CommandFailure::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(&self.environment)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = self.config.working_dir() {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| CommandFailure::Launch {
            command: self.describe(),
            source: Arc::new(e),
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        *self.lock_child() = Some(child);
        let _release = ReleaseOnExit(self);

        let (stdout, stderr) = self.drain(stdout, stderr)?;
        let status = self.wait_for_exit()?;

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(SIGNALLED_EXIT_CODE),
            failure: None,
        })
    }

    /// Reads both streams to the end on two threads running side by side.
    fn drain<O, E>(
        &self,
        stdout: Option<O>,
        stderr: Option<E>,
    ) -> Result<(String, String), CommandFailure>
    where
        O: Read + Send,
        E: Read + Send,
    {
        let charset = self.config.charset();
        let stdout_buffer_size = self.config.stdout_buffer_size();
        let stderr_buffer_size = self.config.stderr_buffer_size();

        thread::scope(|scope| {
            let stdout_reader = thread::Builder::new()
                .name("stdout reader".to_string())
                .spawn_scoped(scope, move || read_stream(stdout, stdout_buffer_size, charset))
                .map_err(|_| self.reader_failure("stdout"))?;

            let stderr_reader = match thread::Builder::new()
                .name("stderr reader".to_string())
                .spawn_scoped(scope, move || read_stream(stderr, stderr_buffer_size, charset))
            {
                Ok(handle) => handle,
                Err(_) => {
                    // The stdout reader can only finish once the child is gone.
                    self.kill();
                    return Err(self.reader_failure("stderr"));
                }
            };

            let stdout = self.join_reader(stdout_reader, "stdout");
            let stderr = self.join_reader(stderr_reader, "stderr");
            Ok((stdout?, stderr?))
        })
    }

    fn join_reader(
        &self,
        handle: ScopedJoinHandle<'_, io::Result<String>>,
        stream: &'static str,
    ) -> Result<String, CommandFailure> {
        match handle.join() {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(source)) => Err(CommandFailure::Read {
                command: self.describe(),
                stream,
                source: Arc::new(source),
            }),
            Err(_) => Err(self.reader_failure(stream)),
        }
    }

    fn reader_failure(&self, stream: &'static str) -> CommandFailure {
        CommandFailure::Reader {
            command: self.describe(),
            stream,
        }
    }

    /// Polls for exit so that the handle lock is never held while blocking.
    fn wait_for_exit(&self) -> Result<ExitStatus, CommandFailure> {
        loop {
            let polled = match self.lock_child().as_mut() {
                Some(child) => child.try_wait(),
                None => Err(io::Error::other("process handle already released")),
            };
            match polled {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => thread::sleep(self.config.kill_poll_interval()),
                Err(e) => {
                    return Err(CommandFailure::Wait {
                        command: self.describe(),
                        source: Arc::new(e),
                    })
                }
            }
        }
    }

    fn lock_child(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overridden: Vec<&String> = self.environment.keys().collect();
        overridden.sort();
        f.debug_struct("ProcessRunner")
            .field("command", &self.command)
            .field("environment_keys", &overridden)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Kills and releases the child however `run` exits.
struct ReleaseOnExit<'a>(&'a ProcessRunner);

impl Drop for ReleaseOnExit<'_> {
    fn drop(&mut self) {
        if !self.0.kill() {
            warn!(command = %self.0.describe(), "Process still alive after kill timeout");
        }
        self.0.lock_child().take();
    }
}

fn read_stream(
    stream: Option<impl Read>,
    buffer_size: usize,
    charset: &CharsetConfig,
) -> io::Result<String> {
    let Some(mut stream) = stream else {
        return Ok(String::new());
    };
    let bytes = read_all(&mut stream, buffer_size)?;
    Ok(charset::decode(&bytes, charset))
}

fn read_all(stream: &mut impl Read, buffer_size: usize) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut buffer = vec![0u8; buffer_size];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => return Ok(bytes),
            Ok(n) => bytes.extend_from_slice(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_without_process_is_immediately_true() {
        let runner = ProcessRunner::new(["git", "log"]);
        let started = Instant::now();
        assert!(runner.kill());
        assert!(started.elapsed() < RunnerConfig::default().kill_timeout());
        assert!(!runner.is_running());
    }

    #[test]
    fn describe_includes_working_dir_but_not_environment() {
        let runner = ProcessRunner::new(["git", "log", "--name-status"])
            .with_environment(HashMap::from([(
                "GIT_TOKEN".to_string(),
                "s3cr3t".to_string(),
            )]))
            .with_config(RunnerConfig::default().with_working_dir("/repo"));

        insta::assert_snapshot!(
            runner.describe(),
            @"git log --name-status (working directory '/repo')"
        );
        assert!(!format!("{runner:?}").contains("s3cr3t"));
    }

    #[test]
    fn describe_without_working_dir() {
        let runner = ProcessRunner::new(["hg", "log"]);
        assert_eq!(runner.describe(), "hg log");
    }

    #[test]
    fn empty_command_is_a_failure() {
        let result = ProcessRunner::new(Vec::<String>::new()).execute();
        assert!(matches!(result.failure, Some(CommandFailure::EmptyCommand)));
        assert_eq!(result.exit_code, EXIT_CODE_BEFORE_FINISHED);
        assert!(!result.is_successful());
    }

    #[test]
    fn missing_binary_is_a_launch_failure() {
        let result = ProcessRunner::new(["vcs-log-no-such-binary-4f1c", "--version"]).execute();
        assert!(matches!(result.failure, Some(CommandFailure::Launch { .. })));
        assert_eq!(result.exit_code, EXIT_CODE_BEFORE_FINISHED);
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn read_all_uses_small_buffers() {
        let mut input: &[u8] = b"abcdefghij";
        assert_eq!(read_all(&mut input, 3).unwrap(), b"abcdefghij");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        fn sh(script: &str) -> ProcessRunner {
            ProcessRunner::new(["sh", "-c", script])
        }

        #[test]
        fn captures_output_and_exit_code() {
            let result = sh("printf out; printf err >&2; exit 3").execute();
            assert!(result.failure.is_none());
            assert_eq!(result.stdout, "out");
            assert_eq!(result.stderr, "err");
            assert_eq!(result.exit_code, 3);
            assert!(!result.is_successful());
        }

        #[test]
        fn successful_run() {
            let result = sh("echo hello").execute();
            assert!(result.is_successful());
            assert_eq!(result.stdout, "hello\n");
        }

        #[test]
        fn environment_overlay_is_visible_to_child() {
            let result = sh("printf \"$VCS_LOG_TEST_VALUE:$PATH\"")
                .with_environment(HashMap::from([(
                    "VCS_LOG_TEST_VALUE".to_string(),
                    "overlay".to_string(),
                )]))
                .execute();
            let (value, path) = result.stdout.split_once(':').unwrap();
            assert_eq!(value, "overlay");
            // The inherited environment is still there.
            assert!(!path.is_empty());
        }

        #[test]
        fn working_dir_is_applied() {
            let dir = tempfile::tempdir().unwrap();
            let result = sh("pwd -P")
                .with_config(RunnerConfig::default().with_working_dir(dir.path()))
                .execute();
            let expected = dir.path().canonicalize().unwrap();
            assert_eq!(result.stdout.trim_end(), expected.to_str().unwrap());
        }

        #[test]
        fn handle_is_released_after_execute() {
            let runner = sh("exit 0");
            runner.execute();
            assert!(!runner.is_running());
            assert!(runner.kill());
        }
    }
}
