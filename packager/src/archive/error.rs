//! Error types for archive writing.
//!
//! Covers I/O failures, zip encoder problems, and manifest entries that do
//! not exist in the snapshot being archived.

use thiserror::Error;

/// Errors arising while writing distribution archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An I/O operation failed (reading snapshot files, writing the archive).
    #[error("I/O error during archiving: {0}")]
    Io(#[from] std::io::Error),

    /// The zip encoder rejected an entry or failed to finish.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A listed entry does not exist under the archive root.
    #[error("listed path {path} does not exist in the snapshot")]
    MissingEntry {
        /// The missing relative path.
        path: String,
    },

    /// Nothing would be written to the archive.
    #[error("no entries to archive for {name}")]
    Empty {
        /// The archive file name.
        name: String,
    },
}
