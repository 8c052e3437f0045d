//! VCS commands: log extraction and file content retrieval.
//!
//! Each supported VCS provides its own implementations of [`VcsCommand`];
//! [`VcsRoot`] picks the right one for a repository.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{DateTime, Utc};
use clap::ValueEnum;

use crate::data::{LogFileContentResult, LogResult};
use crate::process::RunnerConfig;

mod error;
pub mod git;
pub mod hg;
mod pipeline;
pub mod svn;

pub use error::{LogError, ParseError};

/// Fallback for rename resolution parallelism when the CPU count is unknown.
const DEFAULT_RENAME_PARALLELISM: usize = 4;

/// A command against one repository that can describe itself for diagnostics.
pub trait VcsCommand {
    /// What running the command produces.
    type Output;

    /// Runs the command. Failures are reported inside the output.
    fn execute(&self) -> Self::Output;

    /// Renders the command line for diagnostics.
    fn describe(&self) -> String;
}

/// A boxed log command for any VCS.
pub type LogCommand = Box<dyn VcsCommand<Output = LogResult> + Send + Sync>;

/// A boxed file content command for any VCS.
pub type ContentCommand = Box<dyn VcsCommand<Output = LogFileContentResult> + Send + Sync>;

/// Supported version-control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VcsKind {
    /// Git.
    Git,
    /// Mercurial.
    Hg,
    /// Subversion; file content only.
    Svn,
}

impl VcsKind {
    /// Guesses the VCS of a working copy from its metadata directory.
    pub fn detect(path: &Path) -> Option<Self> {
        if path.join(".git").exists() {
            Some(Self::Git)
        } else if path.join(".hg").is_dir() {
            Some(Self::Hg)
        } else if path.join(".svn").is_dir() {
            Some(Self::Svn)
        } else {
            None
        }
    }
}

/// Settings shared by all commands.
#[derive(Debug, Clone)]
pub struct VcsSettings {
    /// Git executable.
    pub git_path: String,
    /// Mercurial executable.
    pub hg_path: String,
    /// Subversion executable.
    pub svn_path: String,
    /// Environment overrides passed to every child process.
    pub environment: HashMap<String, String>,
    /// Base runner configuration; the working directory is set per root.
    pub runner: RunnerConfig,
    /// Maximum number of rename lookups running at once.
    pub rename_parallelism: usize,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
            hg_path: "hg".to_string(),
            svn_path: "svn".to_string(),
            environment: HashMap::new(),
            runner: RunnerConfig::default(),
            rename_parallelism: thread::available_parallelism()
                .map_or(DEFAULT_RENAME_PARALLELISM, |n| n.get()),
        }
    }
}

/// A repository working copy and the VCS that manages it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsRoot {
    /// VCS managing the working copy.
    pub kind: VcsKind,
    /// Working copy directory, or the repository URL for Subversion.
    pub path: PathBuf,
}

impl VcsRoot {
    /// Creates a root of a known kind.
    pub fn new(kind: VcsKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Creates a root, detecting its kind from the directory contents.
    pub fn detect(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        VcsKind::detect(&path).map(|kind| Self { kind, path })
    }

    /// Builds the log command for commits between `from` and `to`.
    pub fn log_command(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        settings: &VcsSettings,
    ) -> LogCommand {
        match self.kind {
            VcsKind::Git => Box::new(git::GitLog::new(&self.path, from, to, settings)),
            VcsKind::Hg => Box::new(hg::HgLog::new(&self.path, from, to, settings)),
            VcsKind::Svn => Box::new(svn::SvnLog::new(&self.path, settings)),
        }
    }

    /// Builds the command reading `file_path` as of `revision`.
    pub fn content_command(
        &self,
        file_path: &str,
        revision: &str,
        settings: &VcsSettings,
    ) -> ContentCommand {
        match self.kind {
            VcsKind::Git => Box::new(git::GitLogFileContent::new(
                &self.path, file_path, revision, settings,
            )),
            VcsKind::Hg => Box::new(hg::HgLogFileContent::new(
                &self.path, file_path, revision, settings,
            )),
            VcsKind::Svn => Box::new(svn::SvnLogFileContent::new(
                &self.path, file_path, revision, settings,
            )),
        }
    }
}

/// Extracts commits between `from` and `to` from one repository.
///
/// Never fails: problems are reported inside the returned [`LogResult`].
pub fn extract_log(
    root: &VcsRoot,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    settings: &VcsSettings,
) -> LogResult {
    root.log_command(from, to, settings)
        .execute()
        .with_root(&root.path)
}

/// Reads the content of `file_path` as of `revision`.
pub fn log_file_content(
    root: &VcsRoot,
    file_path: &str,
    revision: &str,
    settings: &VcsSettings,
) -> LogFileContentResult {
    root.content_command(file_path, revision, settings).execute()
}

/// Parses epoch seconds into a UTC timestamp.
pub(crate) fn parse_epoch_seconds(value: &str) -> Result<DateTime<Utc>, ParseError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .ok_or_else(|| ParseError::Timestamp(value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn detects_working_copy_kind() {
        let git_dir = tempfile::tempdir().unwrap();
        fs::create_dir(git_dir.path().join(".git")).unwrap();
        let hg_dir = tempfile::tempdir().unwrap();
        fs::create_dir(hg_dir.path().join(".hg")).unwrap();
        let svn_dir = tempfile::tempdir().unwrap();
        fs::create_dir(svn_dir.path().join(".svn")).unwrap();
        let plain_dir = tempfile::tempdir().unwrap();

        assert_eq!(VcsKind::detect(git_dir.path()), Some(VcsKind::Git));
        assert_eq!(VcsKind::detect(hg_dir.path()), Some(VcsKind::Hg));
        assert_eq!(VcsKind::detect(svn_dir.path()), Some(VcsKind::Svn));
        assert_eq!(VcsRoot::detect(plain_dir.path()), None);
    }

    #[test]
    fn git_worktree_file_counts_as_git() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".git"), "gitdir: ../main/.git/worktrees/x\n").unwrap();
        assert_eq!(VcsKind::detect(dir.path()), Some(VcsKind::Git));
    }

    #[test]
    fn epoch_seconds() {
        assert_eq!(parse_epoch_seconds(" 60\n").unwrap().timestamp(), 60);
        assert_eq!(
            parse_epoch_seconds("soon"),
            Err(ParseError::Timestamp("soon".to_string()))
        );
    }

    #[test]
    fn extract_log_reports_launch_failure_as_exception() {
        let settings = VcsSettings {
            git_path: "vcs-log-no-such-git-7d2a".to_string(),
            ..VcsSettings::default()
        };
        let root = VcsRoot::new(VcsKind::Git, std::env::temp_dir());
        let from = DateTime::from_timestamp(0, 0).unwrap();

        let result = extract_log(&root, from, Utc::now(), &settings);

        assert!(!result.is_successful());
        assert!(result.commits.is_empty());
        assert!(result.vcs_errors.is_empty());
        assert!(matches!(result.exceptions.as_slice(), [LogError::Command(_)]));
    }

    #[test]
    fn svn_log_is_reported_as_unsupported() {
        let root = VcsRoot::new(VcsKind::Svn, "svn://example.org/repo");
        let from = DateTime::from_timestamp(0, 0).unwrap();

        let result = extract_log(&root, from, Utc::now(), &VcsSettings::default());

        assert!(result.commits.is_empty());
        assert!(matches!(
            result.exceptions.as_slice(),
            [LogError::Unsupported(_)]
        ));
    }
}
