//! Release snapshots extracted from git tags.
//!
//! The snapshot is the only mutable resource of a build. Its lifecycle is
//! encoded in three types so that the mandated order cannot be broken:
//!
//! 1. [`Snapshot`] - the tree exactly as tagged; patch archives read from it.
//! 2. [`PrunedSnapshot`] - development-only paths removed; full packages.
//! 3. [`UpdateTree`] - installer removed as well; update packages.
//!
//! Each transition consumes the previous state, so a pruned tree can never be
//! used for patch archives and pruning cannot happen twice.

use crate::error::{BuildError, Result};
use crate::git::{DiffProvider, GitRepository};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::fs;
use std::path::{Component, Path};

/// Install manifest shipped inside the tree, relative to the snapshot root.
pub const INSTALL_MANIFEST: &str = "administrator/manifests/files/joomla.xml";

/// Name of the install manifest copy placed at the snapshot root.
pub const ROOT_MANIFEST: &str = "joomla.xml";

/// Installer staging directory removed before update packages.
pub const INSTALLER_DIR: &str = "installation";

/// An unpruned release tree.
#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot {
    root: Utf8PathBuf,
}

/// A release tree with development-only paths removed.
#[derive(Debug, PartialEq, Eq)]
pub struct PrunedSnapshot {
    root: Utf8PathBuf,
}

/// A pruned release tree without the installer.
#[derive(Debug, PartialEq, Eq)]
pub struct UpdateTree {
    root: Utf8PathBuf,
}

impl Snapshot {
    /// Wraps an already extracted tree at `root`.
    #[must_use]
    pub fn at(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// The snapshot directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Removes `paths` (files or directories) relative to the root.
    ///
    /// Paths that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an existing path cannot be removed.
    pub fn prune(self, paths: &[&str]) -> Result<PrunedSnapshot> {
        for path in paths {
            if !remove_path(&self.root.join(path))? {
                debug!("prune: {path} not present");
            }
        }
        Ok(PrunedSnapshot { root: self.root })
    }
}

impl PrunedSnapshot {
    /// The snapshot directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Removes the installer staging directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be removed.
    pub fn strip_installer(self) -> Result<UpdateTree> {
        if !remove_path(&self.root.join(INSTALLER_DIR))? {
            warn!("{INSTALLER_DIR} not present in {}", self.root);
        }
        Ok(UpdateTree { root: self.root })
    }
}

impl UpdateTree {
    /// The snapshot directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Materialises tagged trees into the scratch area.
pub struct SnapshotExtractor<'a> {
    repo: &'a GitRepository<'a>,
}

impl<'a> SnapshotExtractor<'a> {
    /// Creates an extractor reading from `repo`.
    #[must_use]
    pub fn new(repo: &'a GitRepository<'a>) -> Self {
        Self { repo }
    }

    /// Recreates `scratch` and extracts `tag` into `scratch/<tag>`.
    ///
    /// The tag is checked before the scratch area is touched, and the git
    /// archive must succeed before anything is unpacked. The install manifest
    /// is copied to the snapshot root afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TagNotFound`] for an unknown tag,
    /// [`BuildError::Git`] if `git archive` fails,
    /// [`BuildError::PathTraversal`] for an escaping entry, or an I/O error.
    pub fn extract(&self, tag: &str, scratch: &Utf8Path) -> Result<Snapshot> {
        if !self.repo.tag_exists(tag)? {
            return Err(BuildError::TagNotFound {
                tag: tag.to_owned(),
            });
        }

        let stream = self.repo.archive(tag)?;

        recreate_dir(scratch)?;
        let root = scratch.join(tag);
        fs::create_dir_all(&root)?;

        let count = unpack_tar(&stream, &root)?;
        debug!("unpacked {count} entries from {tag} into {root}");

        fs::copy(root.join(INSTALL_MANIFEST), root.join(ROOT_MANIFEST))?;
        Ok(Snapshot { root })
    }
}

/// Deletes `dir` if present and creates it empty.
///
/// # Errors
///
/// Returns an I/O error if removal or creation fails.
pub fn recreate_dir(dir: &Utf8Path) -> std::io::Result<()> {
    if dir.exists() {
        debug!("removing previous scratch area {dir}");
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Unpacks a tar stream into `dest`, returning the number of entries written.
fn unpack_tar(stream: &[u8], dest: &Utf8Path) -> Result<usize> {
    let mut archive = tar::Archive::new(stream);
    let mut count = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions() || kind.is_pax_local_extensions() {
            continue;
        }

        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;

        let dest_path = dest.as_std_path().join(&entry_path);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest_path)?;
        count += 1;
    }

    Ok(count)
}

/// Rejects entry paths that are absolute or contain `..`.
fn validate_entry_path(path: &Path) -> Result<()> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if escapes {
        return Err(BuildError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Removes a file, symlink, or directory tree. Returns false if absent.
fn remove_path(path: &Utf8Path) -> std::io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    debug!("removed {path}");
    Ok(true)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
