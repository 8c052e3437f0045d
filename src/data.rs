//! VCS-agnostic commit model and result types.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod results;

pub use results::{LogFileContentResult, LogResult};

/// Kind of change applied to one file in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// File added (or copied into place).
    New,
    /// File content or type changed.
    Modification,
    /// File removed.
    Deleted,
    /// File renamed or moved.
    Moved,
}

/// One file's change within a commit.
///
/// Invariants, enforced by [`Change::new`]:
/// - `New`: no `file_path_before` and no `revision_before`.
/// - `Deleted`: no `file_path`; `file_path_before` holds the removed path.
/// - `Moved`: both paths present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Change {
    /// What happened to the file.
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Path after the change; `None` if the file no longer exists.
    pub file_path: Option<String>,
    /// Path before the change; `None` for newly added files.
    pub file_path_before: Option<String>,
    /// Revision that introduced the change.
    pub revision: String,
    /// Parent revision; `None` for new files and root commits.
    pub revision_before: Option<String>,
}

impl Change {
    /// Builds a change from the paths reported by a VCS tool.
    ///
    /// `path` is the path after the change and `path_before` the one before
    /// it (identical for everything except renames and copies). The sentinel
    /// rules for new and deleted files are applied here.
    pub fn new(
        change_type: ChangeType,
        path: String,
        path_before: String,
        revision: &str,
        revision_before: Option<&str>,
    ) -> Self {
        let (file_path, file_path_before, revision_before) = match change_type {
            ChangeType::New => (Some(path), None, None),
            ChangeType::Deleted => (None, Some(path_before), revision_before),
            ChangeType::Modification | ChangeType::Moved => {
                (Some(path), Some(path_before), revision_before)
            }
        };

        Self {
            change_type,
            file_path,
            file_path_before,
            revision: revision.to_string(),
            revision_before: revision_before.map(str::to_string),
        }
    }
}

/// One non-merge commit read from VCS history.
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    /// Opaque revision id.
    pub revision: String,
    /// Parent revision; `None` for root commits.
    pub revision_before: Option<String>,
    /// Commit time.
    pub commit_date: DateTime<Utc>,
    /// Author name as reported by the tool.
    pub author_name: String,
    /// Commit message without surrounding whitespace.
    pub comment: String,
    /// Changed files, in tool order.
    pub changes: Vec<Change>,
    /// Repository root the commit was read from. Display only.
    #[serde(skip)]
    pub root: Option<Arc<Path>>,
}

impl Commit {
    /// Returns a copy of this commit with `changes` replacing the current ones.
    #[must_use]
    pub fn with_changes(&self, changes: Vec<Change>) -> Self {
        Self {
            changes,
            ..self.clone()
        }
    }

    /// Returns true if any change has the given type.
    pub fn has_change_of_type(&self, change_type: ChangeType) -> bool {
        self.changes.iter().any(|c| c.change_type == change_type)
    }
}

impl PartialEq for Commit {
    // The root is an attribution detail, not part of a commit's identity.
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
            && self.revision_before == other.revision_before
            && self.commit_date == other.commit_date
            && self.author_name == other.author_name
            && self.comment == other.comment
            && self.changes == other.changes
    }
}

impl Eq for Commit {}
