//! Shared run-then-interpret steps for log and content commands.

use tracing::{debug, warn};

use crate::data::{Commit, LogFileContentResult, LogResult};
use crate::process::ProcessRunner;
use crate::utils::trim_last_newline;
use crate::vcs::ParseError;

/// Runs a log command and turns its output into a [`LogResult`].
///
/// `resolve` post-processes parsed commits (rename resolution for git).
/// Commits come back sorted by date, oldest first.
pub(crate) fn run_log<P, R>(runner: &ProcessRunner, parse: P, resolve: R) -> LogResult
where
    P: FnOnce(&str) -> Result<Vec<Commit>, ParseError>,
    R: FnOnce(Vec<Commit>) -> Vec<Commit>,
{
    let result = runner.execute();
    if let Some(failure) = result.failure {
        return LogResult::from_error(failure);
    }

    if result.exit_code != 0 {
        warn!(
            command = %runner.describe(),
            exit_code = result.exit_code,
            "Log command exited with an error"
        );
        let message = if result.stderr.trim().is_empty() {
            format!(
                "'{}' exited with code {}",
                runner.describe(),
                result.exit_code
            )
        } else {
            result.stderr
        };
        return LogResult::from_vcs_error(message);
    }

    let commits = match parse(&result.stdout) {
        Ok(commits) => commits,
        Err(e) => {
            warn!(command = %runner.describe(), error = %e, "Failed to parse log output");
            return LogResult::from_error(e);
        }
    };
    debug!(count = commits.len(), "Parsed commits");

    let mut commits = resolve(commits);
    commits.sort_by_key(|commit| commit.commit_date);

    let warnings = if result.stderr.trim().is_empty() {
        Vec::new()
    } else {
        vec![result.stderr]
    };
    LogResult::new(commits, warnings)
}

/// Runs a content command and returns its stdout minus one trailing newline.
pub(crate) fn run_content(runner: &ProcessRunner) -> LogFileContentResult {
    let result = runner.execute();
    if let Some(failure) = result.failure {
        return LogFileContentResult::from_error(failure);
    }
    if result.exit_code != 0 {
        return LogFileContentResult::from_vcs_error(result.stderr, result.exit_code);
    }
    LogFileContentResult::new(trim_last_newline(&result.stdout))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::vcs::LogError;
    use chrono::DateTime;

    fn sh(script: &str) -> ProcessRunner {
        ProcessRunner::new(["sh", "-c", script])
    }

    fn commit(revision: &str, timestamp: i64) -> Commit {
        Commit {
            revision: revision.to_string(),
            revision_before: None,
            commit_date: DateTime::from_timestamp(timestamp, 0).unwrap(),
            author_name: "Alice".to_string(),
            comment: String::new(),
            changes: Vec::new(),
            root: None,
        }
    }

    #[test]
    fn non_zero_exit_reports_stderr_and_skips_parsing() {
        let runner = sh("echo 'fatal: not a git repository' >&2; exit 128");

        let result = run_log(&runner, |_| panic!("parser must not run"), |c| c);

        assert_eq!(result.vcs_errors, ["fatal: not a git repository\n"]);
        assert!(result.exceptions.is_empty());
        assert!(result.commits.is_empty());
    }

    #[test]
    fn non_zero_exit_without_stderr_still_reports_an_error() {
        let result = run_log(&sh("exit 3"), |_| Ok(Vec::new()), |c| c);
        assert_eq!(result.vcs_errors.len(), 1);
        assert!(result.vcs_errors[0].contains("exited with code 3"));
    }

    #[test]
    fn parse_failure_becomes_an_exception() {
        let result = run_log(
            &sh("echo garbage"),
            |_| Err(ParseError::ChangeType("Q".to_string())),
            |c| c,
        );
        assert!(matches!(
            result.exceptions.as_slice(),
            [LogError::Parse(ParseError::ChangeType(_))]
        ));
    }

    #[test]
    fn successful_run_sorts_and_keeps_stderr_warnings() {
        let result = run_log(
            &sh("echo 'warning: refname is ambiguous' >&2"),
            |_| Ok(vec![commit("b", 20), commit("a", 10)]),
            |commits| commits,
        );

        let revisions: Vec<&str> = result.commits.iter().map(|c| c.revision.as_str()).collect();
        assert_eq!(revisions, ["a", "b"]);
        assert_eq!(result.vcs_errors, ["warning: refname is ambiguous\n"]);
    }

    #[test]
    fn content_trims_one_trailing_newline() {
        let result = run_content(&sh("printf 'line 1\\nline 2\\n\\n'"));
        assert!(result.is_successful());
        assert_eq!(result.text(), "line 1\nline 2\n");
    }

    #[test]
    fn content_failure_keeps_exit_code() {
        let result = run_content(&sh("echo 'fatal: path does not exist' >&2; exit 128"));
        assert_eq!(result.exit_code(), 128);
        assert!(matches!(result.error(), Some(LogError::Vcs(msg)) if msg.contains("does not exist")));
    }
}
