//! Git operations on the Joomla repository.
//!
//! The packager needs three things from git: whether a tag exists, the tree
//! recorded under a tag (as a tar stream from `git archive`), and the
//! name-status diff between two tags. Each command runs through a
//! [`CommandExecutor`] with `-C <repo>` so the process working directory is
//! never changed.

use crate::error::{BuildError, Result};
use crate::exec::{CommandExecutor, stderr_message};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

/// Source of name-status diffs between two release tags.
#[cfg_attr(test, mockall::automock)]
pub trait DiffProvider {
    /// Returns whether `tag` exists in the repository history.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself cannot be performed.
    fn tag_exists(&self, tag: &str) -> Result<bool>;

    /// Returns NUL-delimited `git diff -z --name-status` output from `from`
    /// to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Git`] if the diff command fails or names a path
    /// that is not valid UTF-8.
    fn name_status(&self, from: &str, to: &str) -> Result<String>;
}

/// A git repository driven through an external git executable.
pub struct GitRepository<'a> {
    executor: &'a dyn CommandExecutor,
    git: Utf8PathBuf,
    root: Utf8PathBuf,
}

impl<'a> GitRepository<'a> {
    /// Creates a handle for the repository at `root` using the `git` binary.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, git: &Utf8Path, root: &Utf8Path) -> Self {
        Self {
            executor,
            git: git.to_owned(),
            root: root.to_owned(),
        }
    }

    /// Verifies that `which git` reports the configured executable.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::GitNotFound`] if `which` finds no git and
    /// [`BuildError::GitPathMismatch`] if it finds a different one.
    pub fn verify_executable(&self) -> Result<()> {
        let output = self.executor.run("which", &["git"])?;
        let found = String::from_utf8_lossy(&output.stdout).trim().to_owned();

        if !output.status.success() || found.is_empty() {
            return Err(BuildError::GitNotFound {
                reason: "`which git` returned no executable".to_owned(),
            });
        }

        if found != self.git.as_str() {
            return Err(BuildError::GitPathMismatch {
                configured: self.git.clone(),
                found,
            });
        }

        debug!("using git at {found}");
        Ok(())
    }

    /// Returns the tree recorded under `tag` as an uncompressed tar stream.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Git`] with git's stderr if the archive command
    /// exits unsuccessfully.
    pub fn archive(&self, tag: &str) -> Result<Vec<u8>> {
        let output = self.git_command(&["archive", "--format=tar", tag])?;
        if !output.status.success() {
            return Err(BuildError::Git {
                operation: "archive",
                message: stderr_message(&output),
            });
        }
        Ok(output.stdout)
    }

    fn git_command(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut full_args = vec!["-C", self.root.as_str()];
        full_args.extend_from_slice(args);
        debug!("git {}", full_args.join(" "));
        self.executor.run(self.git.as_str(), &full_args)
    }
}

impl DiffProvider for GitRepository<'_> {
    fn tag_exists(&self, tag: &str) -> Result<bool> {
        let reference = format!("refs/tags/{tag}");
        let output = self.git_command(&["rev-parse", "--verify", "--quiet", &reference])?;
        Ok(output.status.success())
    }

    fn name_status(&self, from: &str, to: &str) -> Result<String> {
        let from_ref = format!("tags/{from}");
        let to_ref = format!("tags/{to}");
        let output = self.git_command(&["diff", "-z", "--name-status", &from_ref, &to_ref])?;
        if !output.status.success() {
            return Err(BuildError::Git {
                operation: "diff",
                message: stderr_message(&output),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| BuildError::Git {
            operation: "diff",
            message: format!("diff names a path that is not valid UTF-8: {e}"),
        })
    }
}
