//! Log command: extracts commits from one or more repositories.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::debug;

use crate::cli::{load_vcs_settings, parse_date, OutputFormat};
use crate::data::{Commit, LogResult};
use crate::vcs::{self, VcsKind, VcsRoot};

/// Log command options.
#[derive(Parser)]
pub struct LogCommand {
    /// Repository working copies to read.
    #[arg(value_name = "ROOT", default_value = ".")]
    pub roots: Vec<PathBuf>,

    /// Start of the range (YYYY-MM-DD or RFC 3339).
    #[arg(long, value_parser = parse_date)]
    pub from: DateTime<Utc>,

    /// End of the range; defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<DateTime<Utc>>,

    /// VCS of every root; detected per root when omitted.
    #[arg(long, value_enum)]
    pub vcs: Option<VcsKind>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Guess the charset of tool output.
    #[arg(long)]
    pub auto_detect_charset: bool,

    /// Exit with an error if any root reported a problem.
    #[arg(long)]
    pub strict: bool,
}

/// Serialized form of an aggregated [`LogResult`].
#[derive(Serialize)]
pub struct LogReport<'a> {
    /// Commits from every root, oldest first.
    pub commits: &'a [Commit],
    /// Errors and warnings printed by the VCS tools.
    pub vcs_errors: &'a [String],
    /// Failures to run a tool or understand its output.
    pub exceptions: Vec<String>,
}

impl<'a> From<&'a LogResult> for LogReport<'a> {
    fn from(result: &'a LogResult) -> Self {
        Self {
            commits: &result.commits,
            vcs_errors: &result.vcs_errors,
            exceptions: result.exceptions.iter().map(ToString::to_string).collect(),
        }
    }
}

impl LogCommand {
    /// Executes the log command.
    pub async fn execute(self) -> Result<()> {
        let to = self.to.unwrap_or_else(Utc::now);
        if to < self.from {
            bail!("--to ({to}) is earlier than --from ({})", self.from);
        }

        let settings = load_vcs_settings(self.auto_detect_charset)?;
        let roots = self
            .roots
            .iter()
            .map(|path| self.resolve_root(path))
            .collect::<Result<Vec<_>>>()?;

        let tasks: Vec<_> = roots
            .into_iter()
            .map(|root| {
                let settings = settings.clone();
                let from = self.from;
                tokio::task::spawn_blocking(move || vcs::extract_log(&root, from, to, &settings))
            })
            .collect();

        let mut aggregate = LogResult::default();
        for task in tasks {
            let result = task.await.context("Log extraction task failed")?;
            aggregate = aggregate.aggregate_with(result);
        }
        debug!(
            commits = aggregate.commits.len(),
            vcs_errors = aggregate.vcs_errors.len(),
            exceptions = aggregate.exceptions.len(),
            "Extraction finished"
        );

        println!("{}", self.format.render(&LogReport::from(&aggregate))?);

        if self.strict && !aggregate.is_successful() {
            bail!("Log extraction reported errors");
        }
        Ok(())
    }

    fn resolve_root(&self, path: &Path) -> Result<VcsRoot> {
        match self.vcs {
            Some(kind) => Ok(VcsRoot::new(kind, path)),
            None => VcsRoot::detect(path).with_context(|| {
                format!(
                    "No .git, .hg or .svn directory in {}. Use --vcs to set the VCS explicitly",
                    path.display()
                )
            }),
        }
    }
}
