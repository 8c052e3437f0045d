//! `git log` over a date range.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use encoding_rs::UTF_8;

use crate::data::LogResult;
use crate::process::ProcessRunner;
use crate::vcs::git::parser::{parse_commits, pretty_format};
use crate::vcs::git::renames::RenameResolver;
use crate::vcs::{pipeline, VcsCommand, VcsSettings};

/// Reads the commits of one git repository between two instants.
#[derive(Debug)]
pub struct GitLog {
    folder: PathBuf,
    runner: ProcessRunner,
    renames: RenameResolver,
}

impl GitLog {
    /// Prepares the log command; nothing runs until [`VcsCommand::execute`].
    pub fn new(folder: &Path, from: DateTime<Utc>, to: DateTime<Utc>, settings: &VcsSettings) -> Self {
        let config = settings
            .runner
            .clone()
            .with_working_dir(folder)
            .with_output_charset(UTF_8);
        let runner = ProcessRunner::new(command_line(&settings.git_path, from, to))
            .with_environment(settings.environment.clone())
            .with_config(config);

        Self {
            folder: folder.to_path_buf(),
            runner,
            renames: RenameResolver::new(folder, settings),
        }
    }

    /// Repository this command reads.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Kills the running `git log`, if any.
    pub fn kill(&self) -> bool {
        self.runner.kill()
    }
}

impl VcsCommand for GitLog {
    type Output = LogResult;

    fn execute(&self) -> LogResult {
        pipeline::run_log(&self.runner, parse_commits, |commits| {
            self.renames.resolve_all(commits)
        })
    }

    fn describe(&self) -> String {
        self.runner.describe()
    }
}

/// Arguments for `git log` between `from` and `to`, as epoch seconds.
pub fn command_line(git_path: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<String> {
    vec![
        git_path.to_string(),
        "log".to_string(),
        pretty_format(),
        format!("--after={}", from.timestamp()),
        format!("--before={}", to.timestamp()),
        "--name-status".to_string(),
        "--encoding=UTF-8".to_string(),
    ]
}
