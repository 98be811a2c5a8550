//! Patch package file lists.
//!
//! A [`Manifest`] is the sorted set of paths archived into one patch package.
//! It always contains the [`ANCHOR_PATHS`] so that every top-level directory
//! and root file is present even when unchanged, which lets the Extension
//! Manager install the patch. Deleted paths are kept in a separate
//! [`DeletedList`] for upgrade tooling.

use crate::changes::{ChangeEntry, classify};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::BTreeSet;
use std::fs;

/// Paths force-included in every patch manifest.
///
/// New top-level directories or root files must be added here.
pub const ANCHOR_PATHS: &[&str] = &[
    "administrator/index.php",
    "bin/index.html",
    "cache/index.html",
    "cli/index.html",
    "components/index.html",
    "images/index.html",
    "includes/index.html",
    "language/index.html",
    "layouts/index.html",
    "libraries/index.html",
    "logs/index.html",
    "media/index.html",
    "modules/index.html",
    "plugins/index.html",
    "templates/index.html",
    "tmp/index.html",
    "htaccess.txt",
    "index.php",
    "LICENSE.txt",
    "README.txt",
    "robots.txt.dist",
    "web.config.txt",
    "joomla.xml",
];

/// Scratch subdirectory holding rendered name-status listings.
pub const DIFF_DOCS_DIR: &str = "diffdocs";

/// Scratch subdirectory holding manifests and deleted lists.
pub const DIFF_CONVERT_DIR: &str = "diffconvert";

/// The deduplicated, sorted set of paths in a patch package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    paths: BTreeSet<String>,
}

impl Manifest {
    /// Iterates over the paths in byte-wise lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Returns whether `path` is listed.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of listed paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no paths are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Renders the manifest as newline-terminated lines.
    #[must_use]
    pub fn render(&self) -> String {
        render_lines(self.iter())
    }
}

/// Paths deleted between two tags, in diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedList {
    paths: Vec<String>,
}

impl DeletedList {
    /// The deleted paths.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Renders the list as newline-terminated lines.
    #[must_use]
    pub fn render(&self) -> String {
        render_lines(self.paths.iter().map(String::as_str))
    }
}

/// The manifest and deleted list for one revision pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFileList {
    /// Paths to archive.
    pub manifest: Manifest,
    /// Paths removed since the earlier revision.
    pub deleted: DeletedList,
}

/// Files written by [`PackageFileList::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFileList {
    /// The manifest file, one path per line.
    pub manifest_path: Utf8PathBuf,
    /// The deleted-list file, one path per line.
    pub deleted_path: Utf8PathBuf,
}

impl PackageFileList {
    /// Writes the manifest and deleted list under `scratch/diffconvert`.
    ///
    /// `label` is the earlier revision's tag, e.g. `3.2.0`; the deleted list
    /// is written next to the manifest with a `-deleted` suffix.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if either file cannot be written.
    pub fn persist(&self, scratch: &Utf8Path, label: &str) -> std::io::Result<PersistedFileList> {
        let dir = scratch.join(DIFF_CONVERT_DIR);
        fs::create_dir_all(&dir)?;

        let manifest_path = dir.join(label);
        let deleted_path = dir.join(format!("{label}-deleted"));
        fs::write(&manifest_path, self.manifest.render())?;
        fs::write(&deleted_path, self.deleted.render())?;
        debug!(
            "wrote {} manifest path(s) and {} deleted path(s) for {label}",
            self.manifest.len(),
            self.deleted.paths().len()
        );

        Ok(PersistedFileList {
            manifest_path,
            deleted_path,
        })
    }
}

/// Merges `anchors` with the non-excluded, non-deleted `entries`.
///
/// The result is independent of entry order and duplicates, so identical
/// inputs always render to identical bytes.
///
/// # Examples
///
/// ```
/// use joomla_build::changes::{ChangeEntry, ChangeStatus};
/// use joomla_build::manifest::build_file_list;
///
/// let entries = vec![
///     ChangeEntry::new("libraries/foo.php", ChangeStatus::Modified),
///     ChangeEntry::new("libraries/bar.php", ChangeStatus::Deleted),
/// ];
/// let list = build_file_list(&["index.php"], &entries);
/// assert_eq!(list.manifest.render(), "index.php\nlibraries/foo.php\n");
/// assert_eq!(list.deleted.render(), "libraries/bar.php\n");
/// ```
#[must_use]
pub fn build_file_list(anchors: &[&str], entries: &[ChangeEntry]) -> PackageFileList {
    let changes = classify(entries);

    let paths = anchors
        .iter()
        .map(|anchor| (*anchor).to_owned())
        .chain(changes.candidates)
        .collect();

    PackageFileList {
        manifest: Manifest { paths },
        deleted: DeletedList {
            paths: changes.deleted,
        },
    }
}

/// Writes raw diff output to `scratch/diffdocs/<label>`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn persist_diff(scratch: &Utf8Path, label: &str, raw: &str) -> std::io::Result<Utf8PathBuf> {
    let dir = scratch.join(DIFF_DOCS_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(label);
    fs::write(&path, raw)?;
    Ok(path)
}

fn render_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines.fold(String::new(), |mut out, line| {
        out.push_str(line);
        out.push('\n');
        out
    })
}
