//! In-process archive writer.
//!
//! Tarballs are built with the `tar` crate over a `bzip2` or `flate2`
//! encoder; zip archives use the `zip` crate with deflate compression.
//! Symbolic links are stored as links rather than followed.

use super::{ArchiveError, ArchiveWriter};
use crate::naming::ArchiveFormat;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::fs::{self, File};
use std::io::{self, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes archives using pure-Rust codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeArchiveWriter;

impl ArchiveWriter for NativeArchiveWriter {
    fn write(
        &self,
        format: ArchiveFormat,
        destination: &Utf8Path,
        root: &Utf8Path,
        entries: &[Utf8PathBuf],
    ) -> Result<(), ArchiveError> {
        let file = File::create(destination)?;
        match format {
            ArchiveFormat::TarBz2 => {
                let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::best());
                write_tar(encoder, root, entries)?.finish()?;
            }
            ArchiveFormat::TarGz => {
                let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
                write_tar(encoder, root, entries)?.finish()?;
            }
            ArchiveFormat::Zip => write_zip(file, root, entries)?,
        }
        Ok(())
    }
}

/// Appends each entry without recursion and returns the inner encoder.
fn write_tar<W: Write>(
    encoder: W,
    root: &Utf8Path,
    entries: &[Utf8PathBuf],
) -> Result<W, ArchiveError> {
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in entries {
        let source = existing_source(root, entry)?;
        trace!("tar: {entry}");
        builder.append_path_with_name(&source, entry.as_std_path())?;
    }

    Ok(builder.into_inner()?)
}

fn write_zip(file: File, root: &Utf8Path, entries: &[Utf8PathBuf]) -> Result<(), ArchiveError> {
    let mut zip = ZipWriter::new(file);

    for entry in entries {
        let source = existing_source(root, entry)?;
        let metadata = fs::symlink_metadata(&source)?;
        let options = entry_options(permissions(&metadata));
        trace!("zip: {entry}");

        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&source)?;
            zip.add_symlink(entry.as_str(), target.to_string_lossy(), options)?;
        } else if metadata.is_dir() {
            zip.add_directory(format!("{entry}/"), options)?;
        } else {
            zip.start_file(entry.as_str(), options)?;
            let mut reader = File::open(&source)?;
            io::copy(&mut reader, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode)
}

/// Resolves `entry` under `root`, failing if it does not exist.
fn existing_source(root: &Utf8Path, entry: &Utf8Path) -> Result<Utf8PathBuf, ArchiveError> {
    let source = root.join(entry);
    if fs::symlink_metadata(&source).is_err() {
        return Err(ArchiveError::MissingEntry {
            path: entry.to_string(),
        });
    }
    Ok(source)
}

#[cfg(unix)]
fn permissions(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() { 0o755 } else { 0o644 }
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
