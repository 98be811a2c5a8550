//! Distribution archive assembly.
//!
//! Every package is written in the three [`ArchiveFormat`]s. The writer adds
//! exactly the entries it is given and never recurses, so callers decide the
//! contents up front: a patch manifest lists individual files, while a full
//! package lists every file and directory of the tree.
//!
//! # Sub-modules
//!
//! - [`error`] - [`ArchiveError`] for writer failures.
//! - [`native`] - [`NativeArchiveWriter`], backed by the `tar`, `flate2`,
//!   `bzip2`, and `zip` crates.

pub mod error;
pub mod native;

pub use error::ArchiveError;
pub use native::NativeArchiveWriter;

use crate::manifest::Manifest;
use crate::naming::{ArchiveFormat, PackageName};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;
use walkdir::WalkDir;

/// Writes one archive in one format.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveWriter {
    /// Writes `entries`, relative to `root`, into a `format` archive at
    /// `destination`.
    ///
    /// Directories listed in `entries` are stored as directory entries only;
    /// their contents are added only if listed themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MissingEntry`] if an entry does not exist under
    /// `root`, or an I/O or zip error if writing fails.
    fn write(
        &self,
        format: ArchiveFormat,
        destination: &Utf8Path,
        root: &Utf8Path,
        entries: &[Utf8PathBuf],
    ) -> Result<(), ArchiveError>;
}

/// Converts a manifest into archive entries.
#[must_use]
pub fn manifest_entries(manifest: &Manifest) -> Vec<Utf8PathBuf> {
    manifest.iter().map(Utf8PathBuf::from).collect()
}

/// Lists every directory and file under `root`, sorted by name.
///
/// Top-level names beginning with `.` are skipped, matching a shell `*`
/// glob over the tree root.
///
/// # Errors
///
/// Returns an I/O error if the tree cannot be walked or contains a non-UTF-8
/// path.
pub fn tree_entries(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ArchiveError> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() != 1 || !is_hidden(entry.file_name()));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(root.as_std_path())
            .map_err(std::io::Error::other)?;
        let relative = Utf8PathBuf::try_from(relative.to_path_buf())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        entries.push(relative);
    }
    Ok(entries)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Writes `entries` from `root` in every format under `output_dir`.
///
/// Returns the archive paths in emission order (`tar.bz2`, `tar.gz`, `zip`).
/// The first failing format aborts the remaining ones.
///
/// # Errors
///
/// Returns [`ArchiveError::Empty`] if `entries` is empty, or the first error
/// reported by `writer`.
pub fn assemble(
    writer: &dyn ArchiveWriter,
    root: &Utf8Path,
    entries: &[Utf8PathBuf],
    output_dir: &Utf8Path,
    name: &PackageName,
) -> Result<Vec<Utf8PathBuf>, ArchiveError> {
    if entries.is_empty() {
        return Err(ArchiveError::Empty {
            name: name.to_string(),
        });
    }

    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(ArchiveFormat::ALL.len());
    for format in ArchiveFormat::ALL {
        let destination = output_dir.join(name.filename(format));
        debug!("writing {} entries to {destination}", entries.len());
        writer.write(format, &destination, root, entries)?;
        info!("created {destination}");
        written.push(destination);
    }
    Ok(written)
}
