//! Patch package construction.
//!
//! For every earlier maintenance revision of the release line, newest first,
//! the patch builder diffs the revision's tag against the target tag,
//! persists the diff, manifest, and deleted list, and (for the oldest and the
//! newest prior revision only) writes the patch archives from the unpruned
//! snapshot.

use crate::archive::{ArchiveWriter, assemble, manifest_entries};
use crate::changes::compute_changes;
use crate::error::Result;
use crate::git::DiffProvider;
use crate::manifest::{
    ANCHOR_PATHS, PackageFileList, PersistedFileList, build_file_list, persist_diff,
};
use crate::naming::{PackageKind, PackageName};
use crate::output::write_line;
use crate::snapshot::Snapshot;
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Earlier revisions to diff against `dev_level`, newest first.
///
/// # Examples
///
/// ```
/// use joomla_build::patch::prior_revisions;
///
/// assert_eq!(prior_revisions(3).collect::<Vec<_>>(), [2, 1, 0]);
/// assert_eq!(prior_revisions(0).count(), 0);
/// ```
pub fn prior_revisions(dev_level: u32) -> impl Iterator<Item = u32> {
    (0..dev_level).rev()
}

/// Whether `revision` gets patch archives when packaging `dev_level`.
///
/// Only revision 0 and the most recent prior revision are archived;
/// intermediate revisions still get a manifest and deleted list.
#[must_use]
pub fn emits_archive(revision: u32, dev_level: u32) -> bool {
    revision == 0 || revision.checked_add(1) == Some(dev_level)
}

/// The result of processing one prior revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The earlier revision that was diffed.
    pub revision: u32,
    /// The computed manifest and deleted list.
    pub file_list: PackageFileList,
    /// Where the manifest and deleted list were written.
    pub persisted: PersistedFileList,
    /// Patch archives written, empty when the revision was skipped.
    pub archives: Vec<Utf8PathBuf>,
}

/// Builds patch packages for one target version.
pub struct PatchBuilder<'a> {
    provider: &'a dyn DiffProvider,
    writer: &'a dyn ArchiveWriter,
    version: &'a Version,
    scratch: &'a Utf8Path,
}

impl<'a> PatchBuilder<'a> {
    /// Creates a builder writing into `scratch`.
    #[must_use]
    pub fn new(
        provider: &'a dyn DiffProvider,
        writer: &'a dyn ArchiveWriter,
        version: &'a Version,
        scratch: &'a Utf8Path,
    ) -> Self {
        Self {
            provider,
            writer,
            version,
            scratch,
        }
    }

    /// Directory receiving patch archives, e.g. `packages3.2`.
    #[must_use]
    pub fn output_dir(&self) -> Utf8PathBuf {
        self.scratch.join(format!("packages{}", self.version.release()))
    }

    /// Processes every prior revision, newest first.
    ///
    /// # Errors
    ///
    /// Stops at the first revision that fails, including a missing tag.
    pub fn build_all(
        &self,
        snapshot: &Snapshot,
        progress: &mut dyn Write,
    ) -> Result<Vec<PatchOutcome>> {
        prior_revisions(self.version.dev_level())
            .map(|revision| self.build_revision(snapshot, revision, progress))
            .collect()
    }

    /// Diffs `revision` against the target and writes its artefacts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BuildError::TagNotFound`] if the revision was
    /// never tagged, or any git, I/O, or archive error.
    pub fn build_revision(
        &self,
        snapshot: &Snapshot,
        revision: u32,
        progress: &mut dyn Write,
    ) -> Result<PatchOutcome> {
        write_line(progress, format!("Create version {revision} update packages."));

        let previous_tag = self.version.tag_for(revision);
        let target_tag = self.version.full_version();
        let diff = compute_changes(self.provider, &previous_tag, &target_tag)?;
        persist_diff(self.scratch, &previous_tag, &diff.listing)?;

        let file_list = build_file_list(ANCHOR_PATHS, &diff.entries);
        let persisted = file_list.persist(self.scratch, &previous_tag)?;

        let archives = if emits_archive(revision, self.version.dev_level()) {
            let name = PackageName::new(
                self.version,
                PackageKind::Patch {
                    from_revision: revision,
                },
            );
            assemble(
                self.writer,
                snapshot.root(),
                &manifest_entries(&file_list.manifest),
                &self.output_dir(),
                &name,
            )?
        } else {
            write_line(
                progress,
                format!("Skipping patch archive for version {previous_tag}"),
            );
            Vec::new()
        };

        Ok(PatchOutcome {
            revision,
            file_list,
            persisted,
            archives,
        })
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
