//! Rename detection for commits whose log shows a delete plus an add.
//!
//! `git log --name-status` reports renames only when git's heuristics fire
//! for the whole range; re-running `git show -M` per commit catches the rest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, warn};

use crate::data::{ChangeType, Commit};
use crate::process::{ProcessRunner, RunnerConfig};
use crate::vcs::git::parser::parse_changes;
use crate::vcs::VcsSettings;

/// Returns true if `commit` has both a deleted and an added file.
pub fn is_rename_candidate(commit: &Commit) -> bool {
    commit.has_change_of_type(ChangeType::Deleted) && commit.has_change_of_type(ChangeType::New)
}

/// Re-reads candidate commits with rename detection enabled.
#[derive(Debug, Clone)]
pub struct RenameResolver {
    git_path: String,
    folder: PathBuf,
    environment: HashMap<String, String>,
    config: RunnerConfig,
    parallelism: usize,
}

impl RenameResolver {
    /// Creates a resolver for the repository at `folder`.
    pub fn new(folder: &Path, settings: &VcsSettings) -> Self {
        Self {
            git_path: settings.git_path.clone(),
            folder: folder.to_path_buf(),
            environment: settings.environment.clone(),
            config: settings.runner.clone().with_working_dir(folder),
            parallelism: settings.rename_parallelism.max(1),
        }
    }

    /// Builds the `git show` invocation for one revision.
    pub fn show_command(&self, revision: &str) -> ProcessRunner {
        ProcessRunner::new([
            self.git_path.as_str(),
            "show",
            "-M",
            "--pretty=format:",
            "--name-status",
            revision,
        ])
        .with_environment(self.environment.clone())
        .with_config(self.config.clone())
    }

    /// Returns `commit` with renames resolved, or unchanged if it is not a
    /// candidate or the lookup fails.
    pub fn resolve(&self, commit: &Commit) -> Commit {
        if !is_rename_candidate(commit) {
            return commit.clone();
        }

        let runner = self.show_command(&commit.revision);
        let result = runner.execute();
        if let Some(failure) = &result.failure {
            warn!(
                revision = %commit.revision,
                error = %failure,
                "Rename lookup failed, keeping original changes"
            );
            return commit.clone();
        }
        if result.exit_code != 0 {
            warn!(
                revision = %commit.revision,
                exit_code = result.exit_code,
                stderr = %result.stderr.trim(),
                "Rename lookup exited with an error, keeping original changes"
            );
            return commit.clone();
        }

        match parse_changes(
            &result.stdout,
            &commit.revision,
            commit.revision_before.as_deref(),
        ) {
            Ok(changes) if !changes.is_empty() => {
                debug!(revision = %commit.revision, "Resolved renames");
                commit.with_changes(changes)
            }
            Ok(_) => commit.clone(),
            Err(e) => {
                warn!(
                    revision = %commit.revision,
                    error = %e,
                    "Could not parse rename lookup output, keeping original changes"
                );
                commit.clone()
            }
        }
    }

    /// Resolves every candidate in `commits`, keeping their order.
    ///
    /// Lookups run on up to `rename_parallelism` threads. A worker that
    /// panics leaves its commits unchanged.
    pub fn resolve_all(&self, mut commits: Vec<Commit>) -> Vec<Commit> {
        let candidates: Vec<usize> = commits
            .iter()
            .enumerate()
            .filter(|(_, commit)| is_rename_candidate(commit))
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() {
            return commits;
        }

        let workers = self.parallelism.min(candidates.len());
        debug!(
            candidates = candidates.len(),
            workers,
            folder = %self.folder.display(),
            "Resolving renames"
        );

        let resolved: Vec<(usize, Commit)> = if workers == 1 {
            candidates
                .iter()
                .map(|&index| (index, self.resolve(&commits[index])))
                .collect()
        } else {
            let shared = &commits;
            thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|worker| {
                        let indices: Vec<usize> =
                            candidates.iter().copied().skip(worker).step_by(workers).collect();
                        scope.spawn(move || {
                            indices
                                .into_iter()
                                .map(|index| (index, self.resolve(&shared[index])))
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .filter_map(|handle| handle.join().ok())
                    .flatten()
                    .collect()
            })
        };

        for (index, commit) in resolved {
            commits[index] = commit;
        }
        commits
    }
}
