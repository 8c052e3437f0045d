//! `hg cat -r <revision> <path>`.

use std::path::Path;

use crate::data::LogFileContentResult;
use crate::process::ProcessRunner;
use crate::vcs::{pipeline, VcsCommand, VcsSettings};

/// Reads one file as of one changeset.
#[derive(Debug)]
pub struct HgLogFileContent {
    runner: ProcessRunner,
}

impl HgLogFileContent {
    /// Prepares `hg cat` for `file_path` at `revision` in `folder`.
    pub fn new(folder: &Path, file_path: &str, revision: &str, settings: &VcsSettings) -> Self {
        let runner = ProcessRunner::new([settings.hg_path.as_str(), "cat", "-r", revision, file_path])
            .with_environment(settings.environment.clone())
            .with_config(settings.runner.clone().with_working_dir(folder));
        Self { runner }
    }
}

impl VcsCommand for HgLogFileContent {
    type Output = LogFileContentResult;

    fn execute(&self) -> LogFileContentResult {
        pipeline::run_content(&self.runner)
    }

    fn describe(&self) -> String {
        self.runner.describe()
    }
}
