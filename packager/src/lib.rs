//! Joomla release packager library.
//!
//! Builds the distribution archives for a Joomla release from the git tags of
//! the repository: patch packages containing only what changed since earlier
//! maintenance releases, a full package, and an update package without the
//! installer. It is used by the `joomla-build` binary and can be driven
//! programmatically with substitute git and archive back ends for testing.
//!
//! # Modules
//!
//! - [`archive`] - Archive writing in `.tar.bz2`, `.tar.gz`, and `.zip`
//! - [`changes`] - Name-status parsing, exclusion, and classification
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Optional `build/packager.toml` settings
//! - [`error`] - Error types for release builds
//! - [`exec`] - External command execution
//! - [`full_package`] - Full and update package construction
//! - [`git`] - Tag lookup, tree export, and tag diffs
//! - [`manifest`] - Package manifests and deleted-file lists
//! - [`naming`] - Archive naming conventions
//! - [`output`] - Progress output
//! - [`patch`] - Patch package construction
//! - [`release`] - Release build orchestration
//! - [`snapshot`] - Release snapshot extraction and pruning
//! - [`version`] - Version metadata resolution

pub mod archive;
pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod full_package;
pub mod git;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod patch;
pub mod release;
pub mod snapshot;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
