//! Progress output for release builds.
//!
//! Build stages report human-readable progress through a `&mut dyn Write`
//! (stderr in the binary, a buffer in tests, a sink when `--quiet`).

use std::fmt::Display;
use std::io::Write;

/// Writes one progress line, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort progress; a closed stderr must not abort a build.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_line_appends_newline() {
        let mut out = Vec::new();
        write_line(&mut out, "Start build for version 3.2.1.");
        assert_eq!(out, b"Start build for version 3.2.1.\n");
    }
}
