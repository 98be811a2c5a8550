//! Full and update package construction.
//!
//! Runs strictly after the patch loop: the snapshot is consumed, pruned of
//! development-only paths, archived as the full package, stripped of the
//! installer, and archived again as the update package.

use crate::archive::{ArchiveWriter, assemble, tree_entries};
use crate::error::Result;
use crate::naming::{PackageKind, PackageName};
use crate::output::write_line;
use crate::snapshot::Snapshot;
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Paths removed from the snapshot before the full package is built.
pub const DEV_ONLY_PATHS: &[&str] = &[
    "tests",
    ".gitignore",
    ".travis.yml",
    "build",
    "build.xml",
    "phpunit.xml.dist",
    "travisci-phpunit.xml",
    "README.md",
    "CONTRIBUTING.md",
];

/// Archives written by [`FullPackageBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullPackages {
    /// Full package archives, including the installer.
    pub full: Vec<Utf8PathBuf>,
    /// Update package archives, without the installer.
    pub update: Vec<Utf8PathBuf>,
}

/// Builds the full and update packages for one target version.
pub struct FullPackageBuilder<'a> {
    writer: &'a dyn ArchiveWriter,
    version: &'a Version,
    scratch: &'a Utf8Path,
}

impl<'a> FullPackageBuilder<'a> {
    /// Creates a builder writing into `scratch`.
    #[must_use]
    pub fn new(writer: &'a dyn ArchiveWriter, version: &'a Version, scratch: &'a Utf8Path) -> Self {
        Self {
            writer,
            version,
            scratch,
        }
    }

    /// Directory receiving full and update archives, e.g. `packages_full3.2.1`.
    #[must_use]
    pub fn output_dir(&self) -> Utf8PathBuf {
        self.scratch
            .join(format!("packages_full{}", self.version.full_version()))
    }

    /// Prunes `snapshot` and writes the full then the update packages.
    ///
    /// # Errors
    ///
    /// Returns any filesystem or archive error; nothing further is written
    /// after the first failure.
    pub fn build(&self, snapshot: Snapshot, progress: &mut dyn Write) -> Result<FullPackages> {
        let output_dir = self.output_dir();

        write_line(progress, "Delete folders not included in packages.");
        let pruned = snapshot.prune(DEV_ONLY_PATHS)?;

        write_line(progress, "Build full package files.");
        let full = assemble(
            self.writer,
            pruned.root(),
            &tree_entries(pruned.root())?,
            &output_dir,
            &PackageName::new(self.version, PackageKind::Full),
        )?;

        write_line(progress, "Build full update package.");
        let update_tree = pruned.strip_installer()?;
        let update = assemble(
            self.writer,
            update_tree.root(),
            &tree_entries(update_tree.root())?,
            &output_dir,
            &PackageName::new(self.version, PackageKind::Update),
        )?;

        Ok(FullPackages { full, update })
    }
}

#[cfg(test)]
#[path = "full_package_tests.rs"]
mod tests;
