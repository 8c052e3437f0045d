//! Subversion support: `svn cat` only.

use std::path::Path;

use crate::data::{LogFileContentResult, LogResult};
use crate::process::ProcessRunner;
use crate::vcs::{pipeline, LogError, VcsCommand, VcsSettings};

/// Joins a repository URL (or working copy path), a file and a peg revision.
fn target(location: &Path, file_path: &str, revision: &str) -> String {
    let location = location.to_string_lossy();
    format!(
        "{}/{}@{revision}",
        location.trim_end_matches('/'),
        file_path.trim_start_matches('/')
    )
}

/// Reads one file as of one revision with `svn cat`.
///
/// No working directory is set: the location may be a URL.
#[derive(Debug)]
pub struct SvnLogFileContent {
    runner: ProcessRunner,
}

impl SvnLogFileContent {
    /// Prepares `svn cat <location>/<file_path>@<revision>`.
    pub fn new(location: &Path, file_path: &str, revision: &str, settings: &VcsSettings) -> Self {
        let runner = ProcessRunner::new([
            settings.svn_path.clone(),
            "cat".to_string(),
            target(location, file_path, revision),
        ])
        .with_environment(settings.environment.clone())
        .with_config(settings.runner.clone());
        Self { runner }
    }
}

impl VcsCommand for SvnLogFileContent {
    type Output = LogFileContentResult;

    fn execute(&self) -> LogFileContentResult {
        pipeline::run_content(&self.runner)
    }

    fn describe(&self) -> String {
        self.runner.describe()
    }
}

/// Stand-in log command; Subversion history is not read.
#[derive(Debug)]
pub struct SvnLog {
    description: String,
}

impl SvnLog {
    /// Creates the command for `location`.
    pub fn new(location: &Path, settings: &VcsSettings) -> Self {
        Self {
            description: format!("{} log {}", settings.svn_path, location.display()),
        }
    }
}

impl VcsCommand for SvnLog {
    type Output = LogResult;

    fn execute(&self) -> LogResult {
        LogResult::from_error(LogError::Unsupported("Subversion log extraction"))
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}
