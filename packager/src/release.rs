//! Release build orchestration.
//!
//! Coordinates the stages of a release build in their mandated order:
//! environment check, version resolution, snapshot extraction, the patch
//! loop over the unpruned snapshot, and finally the full and update packages.

use crate::archive::ArchiveWriter;
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::full_package::{FullPackageBuilder, FullPackages};
use crate::git::GitRepository;
use crate::output::write_line;
use crate::patch::{PatchBuilder, PatchOutcome};
use crate::snapshot::SnapshotExtractor;
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::io::Write;

/// Everything a release build needs.
pub struct ReleaseContext<'a> {
    /// Runs git and `which`.
    pub executor: &'a dyn CommandExecutor,
    /// Writes the distribution archives.
    pub writer: &'a dyn ArchiveWriter,
    /// Loaded packager settings.
    pub config: &'a PackagerConfig,
    /// Root of the Joomla repository.
    pub repo_root: &'a Utf8Path,
}

/// What a completed release build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// The version that was packaged.
    pub version: Version,
    /// One outcome per prior revision, newest first.
    pub patches: Vec<PatchOutcome>,
    /// Full and update archives.
    pub full: FullPackages,
}

impl BuildSummary {
    /// Every archive written, in emission order.
    pub fn archives(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.patches
            .iter()
            .flat_map(|outcome| &outcome.archives)
            .chain(&self.full.full)
            .chain(&self.full.update)
    }
}

/// Builds every package for the version checked out in `context.repo_root`.
///
/// Progress lines and, on success, the list of written archives go to
/// `progress`.
///
/// # Errors
///
/// Fails fast on the first error: a git path mismatch, unreadable version
/// metadata, a missing tag, or any git, I/O, or archive failure. Partial
/// output is left in the scratch directory for the next run to replace.
pub fn run(context: &ReleaseContext<'_>, progress: &mut dyn Write) -> Result<BuildSummary> {
    let repo = GitRepository::new(
        context.executor,
        &context.config.git_path,
        context.repo_root,
    );
    repo.verify_executable()?;

    let version = Version::resolve(context.repo_root, &context.config.version_file)?;
    let full_version = version.full_version();
    write_line(progress, format!("Start build for version {full_version}."));

    let scratch = context.config.scratch_path(context.repo_root);
    let snapshot = SnapshotExtractor::new(&repo).extract(&full_version, &scratch)?;
    info!("extracted {full_version} into {}", snapshot.root());

    let patches =
        PatchBuilder::new(&repo, context.writer, &version, &scratch).build_all(&snapshot, progress)?;
    let full = FullPackageBuilder::new(context.writer, &version, &scratch).build(snapshot, progress)?;

    let summary = BuildSummary {
        version,
        patches,
        full,
    };

    write_line(progress, format!("Build of version {full_version} complete!"));
    for archive in summary.archives() {
        write_line(progress, format!("  {archive}"));
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;
