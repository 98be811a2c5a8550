//! Change sets between release tags.
//!
//! Parses `git diff -z --name-status` output into [`ChangeEntry`] values and
//! splits them into manifest candidates and deleted paths, dropping the
//! development-only paths that never ship in a patch package.

use crate::error::{BuildError, Result};
use crate::git::DiffProvider;
use log::debug;

/// Path prefixes excluded from every patch manifest and deleted list.
///
/// Matching is on the raw prefix, so `build` also covers `build.xml` and
/// `tests` covers `tests/` as well as top-level files beginning with it.
pub const EXCLUDED_PREFIXES: &[&str] = &[
    "tests",
    "installation",
    "build",
    ".git",
    ".travis",
    "travis",
    "phpunit",
];

/// Path suffix for documentation metadata that is never packaged.
pub const EXCLUDED_SUFFIX: &str = ".md";

/// How a path changed between two tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// The path was added.
    Added,
    /// The path's content or mode changed.
    Modified,
    /// The path was removed.
    Deleted,
    /// Any other git status letter (type change, unmerged, unknown).
    Other(char),
}

impl ChangeStatus {
    /// Maps a git status letter to a status.
    #[must_use]
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'A' => Self::Added,
            'M' => Self::Modified,
            'D' => Self::Deleted,
            other => Self::Other(other),
        }
    }
}

/// A path and how it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// The kind of change.
    pub status: ChangeStatus,
}

impl ChangeEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// Changed paths split by whether they belong in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Added or modified paths, in diff order.
    pub candidates: Vec<String>,
    /// Deleted paths, in diff order.
    pub deleted: Vec<String>,
}

/// Returns true for paths that never appear in a patch package.
///
/// # Examples
///
/// ```
/// use joomla_build::changes::is_excluded;
///
/// assert!(is_excluded("tests/unit/bootstrap.php"));
/// assert!(is_excluded("libraries/vendor/README.md"));
/// assert!(!is_excluded("libraries/cms/version/version.php"));
/// ```
#[must_use]
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
        || path.ends_with(EXCLUDED_SUFFIX)
}

/// One name-status record: the status field and its one or two paths.
struct DiffRecord<'a> {
    status: &'a str,
    letter: char,
    paths: Vec<&'a str>,
}

/// Splits NUL-delimited `git diff -z --name-status` output into records.
///
/// Paths are taken verbatim; `-z` disables git's quoting of unusual names.
fn records(output: &str) -> Result<Vec<DiffRecord<'_>>> {
    let malformed = |field: &str| BuildError::MalformedDiff {
        line: field.to_owned(),
    };
    let mut fields = output.split('\0').filter(|field| !field.is_empty());
    let mut records = Vec::new();

    while let Some(status) = fields.next() {
        let letter = status_letter(status).ok_or_else(|| malformed(status))?;
        let arity = if matches!(letter, 'R' | 'C') { 2 } else { 1 };
        let paths: Vec<&str> = fields.by_ref().take(arity).collect();
        if paths.len() != arity {
            return Err(malformed(status));
        }
        records.push(DiffRecord {
            status,
            letter,
            paths,
        });
    }

    Ok(records)
}

/// Returns the status letter of a field such as `M` or `R087`.
fn status_letter(field: &str) -> Option<char> {
    let mut chars = field.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    chars.all(|c| c.is_ascii_digit()).then_some(letter)
}

/// Parses `git diff -z --name-status` output.
///
/// Renames contribute their source as a deletion and their destination as an
/// addition; copies contribute only their destination.
///
/// # Errors
///
/// Returns [`BuildError::MalformedDiff`] for a field that is not a status, or
/// a status without its path(s).
///
/// # Examples
///
/// ```
/// use joomla_build::changes::{ChangeEntry, ChangeStatus, parse_name_status};
///
/// let entries = parse_name_status("M\0libraries/foo.php\0D\0libraries/bar.php\0")?;
/// assert_eq!(entries[1], ChangeEntry::new("libraries/bar.php", ChangeStatus::Deleted));
/// # Ok::<(), joomla_build::error::BuildError>(())
/// ```
pub fn parse_name_status(output: &str) -> Result<Vec<ChangeEntry>> {
    let mut entries = Vec::new();

    for record in records(output)? {
        match (record.letter, record.paths.as_slice()) {
            ('R', [from, to]) => {
                entries.push(ChangeEntry::new(*from, ChangeStatus::Deleted));
                entries.push(ChangeEntry::new(*to, ChangeStatus::Added));
            }
            ('C', [_, to]) => entries.push(ChangeEntry::new(*to, ChangeStatus::Added)),
            (letter, [path]) => {
                entries.push(ChangeEntry::new(*path, ChangeStatus::from_letter(letter)));
            }
            _ => {
                return Err(BuildError::MalformedDiff {
                    line: record.status.to_owned(),
                });
            }
        }
    }

    Ok(entries)
}

/// Renders `-z` name-status output as tab-separated lines, one per record.
///
/// # Errors
///
/// Returns [`BuildError::MalformedDiff`] under the same conditions as
/// [`parse_name_status`].
pub fn render_name_status(output: &str) -> Result<String> {
    Ok(records(output)?
        .iter()
        .map(|record| format!("{}\t{}\n", record.status, record.paths.join("\t")))
        .collect())
}

/// Splits entries into manifest candidates and deleted paths.
///
/// Excluded paths are dropped from both lists.
#[must_use]
pub fn classify(entries: &[ChangeEntry]) -> ChangeSet {
    let mut set = ChangeSet::default();
    for entry in entries.iter().filter(|entry| !is_excluded(&entry.path)) {
        match entry.status {
            ChangeStatus::Deleted => set.deleted.push(entry.path.clone()),
            _ => set.candidates.push(entry.path.clone()),
        }
    }
    set
}

/// A computed diff between two tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDiff {
    /// Name-status listing as tab-separated lines, persisted for
    /// downstream tooling.
    pub listing: String,
    /// Parsed entries in diff order.
    pub entries: Vec<ChangeEntry>,
}

/// Computes the changes from `previous_tag` to `target_tag`.
///
/// Both tags must exist. A missing tag aborts the iteration rather than
/// producing an empty change set.
///
/// # Errors
///
/// Returns [`BuildError::TagNotFound`] for a missing tag, or any error from
/// the provider or the parser.
pub fn compute_changes(
    provider: &dyn DiffProvider,
    previous_tag: &str,
    target_tag: &str,
) -> Result<TagDiff> {
    for tag in [previous_tag, target_tag] {
        if !provider.tag_exists(tag)? {
            return Err(BuildError::TagNotFound {
                tag: tag.to_owned(),
            });
        }
    }

    let raw = provider.name_status(previous_tag, target_tag)?;
    let entries = parse_name_status(&raw)?;
    let listing = render_name_status(&raw)?;
    debug!(
        "{previous_tag} -> {target_tag}: {} changed path(s)",
        entries.len()
    );
    Ok(TagDiff { listing, entries })
}
