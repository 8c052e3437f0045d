//! Results returned by VCS commands.

use std::path::Path;
use std::sync::Arc;

use crate::data::Commit;
use crate::vcs::LogError;

/// Outcome of a log extraction.
///
/// Failures never surface as `Err`: tool-reported problems land in
/// [`vcs_errors`](Self::vcs_errors), internal ones in
/// [`exceptions`](Self::exceptions). Check [`is_successful`](Self::is_successful)
/// before trusting the commit list.
#[derive(Debug, Clone, Default)]
pub struct LogResult {
    /// Commits ordered by commit date, oldest first.
    pub commits: Vec<Commit>,
    /// Errors and warnings printed by the VCS tool.
    pub vcs_errors: Vec<String>,
    /// Failures to run the tool or to understand its output.
    pub exceptions: Vec<LogError>,
}

impl LogResult {
    /// Builds a result holding commits and any tool warnings.
    pub fn new(commits: Vec<Commit>, vcs_errors: Vec<String>) -> Self {
        Self {
            commits,
            vcs_errors,
            exceptions: Vec::new(),
        }
    }

    /// Builds a result for an extraction that could not complete.
    pub fn from_error(error: impl Into<LogError>) -> Self {
        Self {
            exceptions: vec![error.into()],
            ..Self::default()
        }
    }

    /// Builds a result for a tool that reported an error.
    pub fn from_vcs_error(message: impl Into<String>) -> Self {
        Self {
            vcs_errors: vec![message.into()],
            ..Self::default()
        }
    }

    /// Returns true if neither the tool nor the extraction reported a problem.
    pub fn is_successful(&self) -> bool {
        self.vcs_errors.is_empty() && self.exceptions.is_empty()
    }

    /// Combines two results, keeping commits ordered by date.
    #[must_use]
    pub fn aggregate_with(mut self, other: Self) -> Self {
        self.commits.extend(other.commits);
        self.commits.sort_by_key(|commit| commit.commit_date);
        self.vcs_errors.extend(other.vcs_errors);
        self.exceptions.extend(other.exceptions);
        self
    }

    /// Attaches the repository root to every commit.
    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        let root: Arc<Path> = Arc::from(root);
        for commit in &mut self.commits {
            commit.root = Some(Arc::clone(&root));
        }
        self
    }
}

/// Content of one file at one revision.
#[derive(Debug, Clone)]
pub struct LogFileContentResult {
    text: String,
    exit_code: i32,
    error: Option<LogError>,
}

impl LogFileContentResult {
    /// Builds a successful result.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit_code: 0,
            error: None,
        }
    }

    /// Builds a result for a command that could not complete.
    pub fn from_error(error: impl Into<LogError>) -> Self {
        Self {
            text: String::new(),
            exit_code: 0,
            error: Some(error.into()),
        }
    }

    /// Builds a result for a tool that exited with an error.
    pub fn from_vcs_error(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            text: String::new(),
            exit_code,
            error: Some(LogError::Vcs(stderr.into())),
        }
    }

    /// File content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tool exit code.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Error, if any.
    pub fn error(&self) -> Option<&LogError> {
        self.error.as_ref()
    }

    /// Returns true if the content was read without errors.
    pub fn is_successful(&self) -> bool {
        self.error.is_none() && self.exit_code == 0
    }
}
