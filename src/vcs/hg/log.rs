//! `hg log` over a date range.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use encoding_rs::UTF_8;

use crate::data::LogResult;
use crate::process::ProcessRunner;
use crate::vcs::hg::parser::{parse_commits, template};
use crate::vcs::{pipeline, VcsCommand, VcsSettings};

/// Reads the changesets of one Mercurial repository between two instants.
#[derive(Debug)]
pub struct HgLog {
    folder: PathBuf,
    runner: ProcessRunner,
}

impl HgLog {
    /// Prepares the log command; nothing runs until [`VcsCommand::execute`].
    pub fn new(folder: &Path, from: DateTime<Utc>, to: DateTime<Utc>, settings: &VcsSettings) -> Self {
        let config = settings
            .runner
            .clone()
            .with_working_dir(folder)
            .with_output_charset(UTF_8);
        let runner = ProcessRunner::new(command_line(&settings.hg_path, from, to))
            .with_environment(settings.environment.clone())
            .with_config(config);
        Self {
            folder: folder.to_path_buf(),
            runner,
        }
    }

    /// Repository this command reads.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Kills the running `hg log`, if any.
    pub fn kill(&self) -> bool {
        self.runner.kill()
    }
}

impl VcsCommand for HgLog {
    type Output = LogResult;

    fn execute(&self) -> LogResult {
        pipeline::run_log(&self.runner, parse_commits, |commits| commits)
    }

    fn describe(&self) -> String {
        self.runner.describe()
    }
}

/// Arguments for `hg log` between `from` and `to`.
pub fn command_line(hg_path: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<String> {
    vec![
        hg_path.to_string(),
        "log".to_string(),
        "--encoding".to_string(),
        "UTF-8".to_string(),
        "-r".to_string(),
        format!("date(\"{} 0 to {} 0\")", from.timestamp() - 1, to.timestamp()),
        "--template".to_string(),
        template(),
    ]
}
