//! Content command: prints a file as of a revision.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::cli::load_vcs_settings;
use crate::vcs::{self, VcsKind, VcsRoot};

/// Content command options.
#[derive(Parser)]
pub struct ContentCommand {
    /// Repository working copy.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Revision (commit hash or changeset id).
    #[arg(value_name = "REVISION")]
    pub revision: String,

    /// File path relative to the repository root.
    #[arg(value_name = "PATH")]
    pub path: String,

    /// VCS of the root; detected when omitted.
    #[arg(long, value_enum)]
    pub vcs: Option<VcsKind>,

    /// Guess the charset of the file.
    #[arg(long)]
    pub auto_detect_charset: bool,
}

impl ContentCommand {
    /// Executes the content command.
    pub fn execute(self) -> Result<()> {
        let settings = load_vcs_settings(self.auto_detect_charset)?;
        let root = match self.vcs {
            Some(kind) => VcsRoot::new(kind, &self.root),
            None => VcsRoot::detect(&self.root).with_context(|| {
                format!("No .git, .hg or .svn directory in {}", self.root.display())
            })?,
        };

        let result = vcs::log_file_content(&root, &self.path, &self.revision, &settings);
        if let Some(error) = result.error() {
            bail!(
                "Failed to read {} at {} (exit code {}): {}",
                self.path,
                self.revision,
                result.exit_code(),
                error.to_string().trim()
            );
        }

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", result.text()).context("Failed to write to stdout")?;
        Ok(())
    }
}
