//! Parser for `git log --name-status` output in the crate's delimited format.

use crate::data::{Change, ChangeType, Commit};
use crate::utils::{shortened, trim_message};
use crate::vcs::{parse_epoch_seconds, ParseError};

/// Marks the start of each commit block.
pub const COMMIT_START: &str = "\u{11}\u{12}\u{13}\n";

/// Terminates each field inside a commit block.
pub const FIELD_SEPARATOR: &str = "\u{10}\u{11}\u{12}\n";

/// Revision, parents, timestamp, author, message and the trailing change list.
const FIELD_COUNT: usize = 6;

/// Longest excerpt of a bad block quoted in a parse error.
const BLOCK_EXCERPT_CHARS: usize = 200;

/// Builds the `--pretty` argument matching [`parse_commits`].
///
/// See "PRETTY FORMATS" in git-log(1).
pub fn pretty_format() -> String {
    let commit_start = "%x11%x12%x13%n";
    let field_end = "%x10%x11%x12%n";
    let fields = [
        "%H",        // commit hash
        "%P",        // parent hashes
        "%ct",       // committer date, epoch seconds
        "%an",       // author name
        "%s%n%n%-b", // subject and body
    ];

    let mut format = String::from("--pretty=format:");
    format.push_str(commit_start);
    for field in fields {
        format.push_str(field);
        format.push_str(field_end);
    }
    format
}

/// Parses delimited log output into commits, in output order.
///
/// Merge commits are skipped. Empty output yields no commits.
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

    let parents: Vec<&str> = fields[1].split_whitespace().collect();
    if parents.len() > 1 {
        return Ok(None);
    }

    let revision = fields[0].trim();
    let revision_before = parents.first().copied();
    let commit_date = parse_epoch_seconds(fields[2])?;
    let changes = parse_changes(fields[5], revision, revision_before)?;

    Ok(Some(Commit {
        revision: revision.to_string(),
        revision_before: revision_before.map(str::to_string),
        commit_date,
        author_name: fields[3].to_string(),
        comment: trim_message(fields[4]).to_string(),
        changes,
        root: None,
    }))
}

/// Parses `--name-status` lines into changes for one revision.
///
/// Each non-blank line is `STATUS<TAB>PATH` or, for renames and copies,
/// `STATUS<TAB>OLD<TAB>NEW`.
pub fn parse_changes(
    text: &str,
    revision: &str,
    revision_before: Option<&str>,
) -> Result<Vec<Change>, ParseError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_change(line, revision, revision_before))
        .collect()
}

fn parse_change(
    line: &str,
    revision: &str,
    revision_before: Option<&str>,
) -> Result<Change, ParseError> {
    let line = line.trim_end_matches('\r');
    let mut values = line.split('\t');
    let status = values.next().unwrap_or_default().trim();
    let change_type = parse_change_type(status)?;

    let paths: Vec<&str> = values.collect();
    let (path_before, path) = match paths.as_slice() {
        [path] => (*path, *path),
        [before, after, ..] => (*before, *after),
        [] => return Err(ParseError::ChangeLine(line.to_string())),
    };

    Ok(Change::new(
        change_type,
        unescape_path(path),
        unescape_path(path_before),
        revision,
        revision_before,
    ))
}

/// Maps a status letter to a change type. See `--diff-filter` in git-log(1).
fn parse_change_type(status: &str) -> Result<ChangeType, ParseError> {
    match status.chars().next() {
        Some('A' | 'C') => Ok(ChangeType::New),
        Some('M' | 'T' | 'U' | 'X') => Ok(ChangeType::Modification),
        Some('D') => Ok(ChangeType::Deleted),
        Some('R') => Ok(ChangeType::Moved),
        _ => Err(ParseError::ChangeType(status.to_string())),
    }
}

/// Undoes git's quoting of unusual path names.
///
/// Quoted paths are wrapped in `"` and use C-style escapes, including octal
/// byte escapes for non-ASCII names. Unquoted paths are returned as-is.
pub fn unescape_path(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut input = inner.bytes().peekable();
    while let Some(byte) = input.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match input.next() {
            Some(b'"') => bytes.push(b'"'),
            Some(b'\\') => bytes.push(b'\\'),
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(first @ b'0'..=b'7') => {
                let mut value = u32::from(first - b'0');
                for _ in 0..2 {
                    match input.peek() {
                        Some(&digit @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(digit - b'0');
                            input.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.extend_from_slice(&[b'\\', other]),
            None => bytes.push(b'\\'),
        }
    }

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
