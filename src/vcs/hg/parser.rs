//! Parser for `hg log` output produced with [`template`].

use crate::data::{Change, ChangeType, Commit};
use crate::utils::{shortened, trim_message};
use crate::vcs::git::parser::{COMMIT_START, FIELD_SEPARATOR};
use crate::vcs::{parse_epoch_seconds, ParseError};

/// Ten template fields plus the empty remainder after the last separator.
const FIELD_COUNT: usize = 11;

const BLOCK_EXCERPT_CHARS: usize = 200;

/// Builds the `--template` argument matching [`parse_commits`].
///
/// Separators are embedded as raw characters so the template does not
/// depend on hg's escape handling.
pub fn template() -> String {
    let fields = [
        "{node}",
        "{p1node}",
        "{p2node}",
        "{date|hgdate}",
        "{author|person}",
        "{desc}",
        "{file_adds % '{file}\n'}",
        "{file_mods % '{file}\n'}",
        "{file_dels % '{file}\n'}",
        "{file_copies % '{name}\t{source}\n'}",
    ];

    let mut template = String::from(COMMIT_START);
    for field in fields {
        template.push_str(field);
        template.push_str(FIELD_SEPARATOR);
    }
    template
}

/// Parses templated log output into commits, in output order.
///
/// Merge changesets are skipped.
pub fn parse_commits(stdout: &str) -> Result<Vec<Commit>, ParseError> {
    let mut commits = Vec::new();
    for (index, block) in stdout.split(COMMIT_START).enumerate() {
        if index == 0 && block.trim().is_empty() {
            continue;
        }
        if let Some(commit) = parse_commit(block)? {
            commits.push(commit);
        }
    }
    Ok(commits)
}

fn parse_commit(block: &str) -> Result<Option<Commit>, ParseError> {
    let fields: Vec<&str> = block.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            actual: fields.len(),
            block: shortened(block, BLOCK_EXCERPT_CHARS),
        });
    }

    if !is_null_node(fields[2]) {
        return Ok(None);
    }

    let revision = fields[0].trim();
    let revision_before = Some(fields[1].trim()).filter(|p1| !is_null_node(p1));
    // hgdate is "<epoch seconds> <offset>"
    let seconds = fields[3].split_whitespace().next().unwrap_or_default();
    let commit_date = parse_epoch_seconds(seconds)?;

    Ok(Some(Commit {
        revision: revision.to_string(),
        revision_before: revision_before.map(str::to_string),
        commit_date,
        author_name: fields[4].to_string(),
        comment: trim_message(fields[5]).to_string(),
        changes: collect_changes(&fields[6..10], revision, revision_before)?,
        root: None,
    }))
}

/// Returns true for an empty or all-zero node id.
fn is_null_node(node: &str) -> bool {
    node.trim().chars().all(|c| c == '0')
}

/// Builds changes from the added, modified, deleted and copied file lists.
///
/// An added file copied from a file deleted in the same changeset is a move.
fn collect_changes(
    lists: &[&str],
    revision: &str,
    revision_before: Option<&str>,
) -> Result<Vec<Change>, ParseError> {
    let added = non_blank_lines(lists[0]);
    let modified = non_blank_lines(lists[1]);
    let mut deleted = non_blank_lines(lists[2]);
    let copies = non_blank_lines(lists[3])
        .into_iter()
        .map(|line| {
            line.split_once('\t')
                .ok_or_else(|| ParseError::ChangeLine(line.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut changes = Vec::with_capacity(added.len() + modified.len() + deleted.len());
    for path in added {
        let moved_from = copies
            .iter()
            .find(|(name, _)| *name == path)
            .and_then(|(_, source)| {
                let position = deleted.iter().position(|d| d == source)?;
                Some(deleted.remove(position))
            });
        changes.push(match moved_from {
            Some(source) => Change::new(
                ChangeType::Moved,
                path.to_string(),
                source.to_string(),
                revision,
                revision_before,
            ),
            None => Change::new(
                ChangeType::New,
                path.to_string(),
                path.to_string(),
                revision,
                revision_before,
            ),
        });
    }
    changes.extend(modified.into_iter().map(|path| {
        Change::new(
            ChangeType::Modification,
            path.to_string(),
            path.to_string(),
            revision,
            revision_before,
        )
    }));
    changes.extend(deleted.into_iter().map(|path| {
        Change::new(
            ChangeType::Deleted,
            path.to_string(),
            path.to_string(),
            revision,
            revision_before,
        )
    }));
    Ok(changes)
}

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}
