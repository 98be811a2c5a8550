//! Error types for the release packager.
//!
//! Every stage of a build returns [`BuildError`] so that the binary can stop
//! at the first failure and report it. Variants carry enough context (tag,
//! path, tool output) to tell the release manager what to fix.

use crate::archive::ArchiveError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building release packages.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The git executable found on `PATH` differs from the configured one.
    #[error("git path {configured} does not match the local git executable; set git_path to {found}")]
    GitPathMismatch {
        /// Path configured in `packager.toml` (or the default).
        configured: Utf8PathBuf,
        /// Path reported by `which git`.
        found: String,
    },

    /// No git executable could be located.
    #[error("git executable not found: {reason}")]
    GitNotFound {
        /// Description of why the lookup failed.
        reason: String,
    },

    /// A git command exited unsuccessfully.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed (archive, diff, etc.).
        operation: &'static str,
        /// Trimmed stderr of the failed command.
        message: String,
    },

    /// A release tag does not exist in the repository history.
    #[error("tag {tag} not found in repository; tag the release before building")]
    TagNotFound {
        /// The missing tag name.
        tag: String,
    },

    /// The version metadata file was not found.
    #[error("version file not found at {path}")]
    VersionFileNotFound {
        /// Path where the file was expected.
        path: Utf8PathBuf,
    },

    /// The version metadata file could not be interpreted.
    #[error("invalid version metadata: {reason}")]
    InvalidVersion {
        /// Description of the parse failure.
        reason: String,
    },

    /// A record of `git diff -z --name-status` output could not be parsed.
    #[error("malformed diff record: {line:?}")]
    MalformedDiff {
        /// The offending field.
        line: String,
    },

    /// The packager configuration file could not be parsed.
    #[error("invalid configuration at {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The repository root could not be determined.
    #[error("repository not found: {reason}")]
    RepositoryNotFound {
        /// Description of why discovery failed.
        reason: String,
    },

    /// A snapshot entry would escape the snapshot directory.
    #[error("path traversal detected in tag archive: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: String,
    },

    /// Writing an archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_path_mismatch_suggests_configured_value() {
        let err = BuildError::GitPathMismatch {
            configured: Utf8PathBuf::from("/usr/bin/git"),
            found: "/usr/local/bin/git".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/usr/bin/git"));
        assert!(msg.contains("set git_path to /usr/local/bin/git"));
    }

    #[test]
    fn tag_not_found_names_the_tag() {
        let err = BuildError::TagNotFound {
            tag: "3.2.0".to_owned(),
        };
        assert!(err.to_string().contains("3.2.0"));
    }

    #[test]
    fn git_error_includes_operation_and_message() {
        let err = BuildError::Git {
            operation: "archive",
            message: "fatal: not a valid object name".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("archive"));
        assert!(msg.contains("not a valid object name"));
    }

    #[test]
    fn archive_errors_are_transparent() {
        let err = BuildError::from(ArchiveError::MissingEntry {
            path: "bin/index.html".to_owned(),
        });
        assert!(err.to_string().contains("bin/index.html"));
    }
}
