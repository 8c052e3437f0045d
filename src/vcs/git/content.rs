//! `git show <revision>:<path>`.

use std::path::Path;

use crate::data::LogFileContentResult;
use crate::process::ProcessRunner;
use crate::vcs::{pipeline, VcsCommand, VcsSettings};

/// Reads one file as of one revision.
#[derive(Debug)]
pub struct GitLogFileContent {
    runner: ProcessRunner,
}

impl GitLogFileContent {
    /// Prepares `git show` for `file_path` at `revision` in `folder`.
    pub fn new(folder: &Path, file_path: &str, revision: &str, settings: &VcsSettings) -> Self {
        let runner = ProcessRunner::new([
            settings.git_path.clone(),
            "show".to_string(),
            format!("{revision}:{file_path}"),
        ])
        .with_environment(settings.environment.clone())
        .with_config(settings.runner.clone().with_working_dir(folder));
        Self { runner }
    }
}

impl VcsCommand for GitLogFileContent {
    type Output = LogFileContentResult;

    fn execute(&self) -> LogFileContentResult {
        pipeline::run_content(&self.runner)
    }

    fn describe(&self) -> String {
        self.runner.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn show_argument_joins_revision_and_path() {
        let command = GitLogFileContent::new(
            Path::new("/repo"),
            "src/main.rs",
            "abc123",
            &VcsSettings::default(),
        );
        assert_snapshot!(command.describe(), @"git show abc123:src/main.rs (working directory '/repo')");
    }
}
