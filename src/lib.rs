//! # vcs-log
//!
//! Reads commit history from git and Mercurial repositories by running the
//! VCS command-line tools and parsing their output.
//!
//! ## Features
//!
//! - Deadlock-free subprocess execution with charset detection
//! - Commit and file change extraction over a date range
//! - Rename detection for git commits that delete and add files
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use vcs_log::vcs::{extract_log, VcsRoot, VcsSettings};
//!
//! let root = VcsRoot::detect(".").expect("not a repository");
//! let to = Utc::now();
//! let result = extract_log(&root, to - Duration::days(7), to, &VcsSettings::default());
//! for commit in &result.commits {
//!     println!("{} {}", commit.revision, commit.comment);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod data;
pub mod process;
pub mod utils;
pub mod vcs;

pub use crate::cli::Cli;

/// The current version of vcs-log.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
