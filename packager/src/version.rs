//! Release version metadata.
//!
//! Joomla records its version as PHP class members in
//! `libraries/cms/version/version.php`:
//!
//! ```php
//! public $RELEASE = '3.2';
//! public $DEV_LEVEL = '1';
//! public $DEV_STATUS = 'Stable';
//! ```
//!
//! Newer trees declare the same values as `const RELEASE = '3.2';`. Both
//! forms are accepted.

use crate::error::{BuildError, Result};
use camino::Utf8Path;
use regex::Regex;
use std::sync::LazyLock;

/// The version of the release being packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    release: String,
    dev_level: u32,
    dev_status: String,
}

impl Version {
    /// Creates a version from its components.
    #[must_use]
    pub fn new(release: impl Into<String>, dev_level: u32, dev_status: impl Into<String>) -> Self {
        Self {
            release: release.into(),
            dev_level,
            dev_status: dev_status.into(),
        }
    }

    /// Reads the version file under `repo_root`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::VersionFileNotFound`] when the file is absent and
    /// [`BuildError::InvalidVersion`] when a field is missing or malformed.
    pub fn resolve(repo_root: &Utf8Path, version_file: &Utf8Path) -> Result<Self> {
        let path = repo_root.join(version_file);
        if !path.is_file() {
            return Err(BuildError::VersionFileNotFound { path });
        }
        let source = std::fs::read_to_string(&path)?;
        Self::parse(&source)
    }

    /// Parses version metadata from PHP source text.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidVersion`] when `RELEASE`, `DEV_LEVEL`, or
    /// `DEV_STATUS` is missing, or `DEV_LEVEL` is not a non-negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use joomla_build::version::Version;
    ///
    /// let source = "public $RELEASE = '3.2';\n\
    ///               public $DEV_LEVEL = '1';\n\
    ///               public $DEV_STATUS = 'Release Candidate';";
    /// let version = Version::parse(source)?;
    /// assert_eq!(version.full_version(), "3.2.1");
    /// assert_eq!(version.package_stability(), "Release_Candidate");
    /// # Ok::<(), joomla_build::error::BuildError>(())
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let release = extract_field(source, "RELEASE")?;
        let dev_level_text = extract_field(source, "DEV_LEVEL")?;
        let dev_status = extract_field(source, "DEV_STATUS")?;

        let dev_level = dev_level_text
            .trim()
            .parse::<u32>()
            .map_err(|e| BuildError::InvalidVersion {
                reason: format!("DEV_LEVEL {dev_level_text:?} is not a revision number: {e}"),
            })?;

        Ok(Self {
            release,
            dev_level,
            dev_status,
        })
    }

    /// The `major.minor` release line, e.g. `3.2`.
    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// The maintenance revision within the release line.
    #[must_use]
    pub fn dev_level(&self) -> u32 {
        self.dev_level
    }

    /// The stability label as written in the version file.
    #[must_use]
    pub fn dev_status(&self) -> &str {
        &self.dev_status
    }

    /// `release.dev_level`, which is also the git tag of this release.
    #[must_use]
    pub fn full_version(&self) -> String {
        format!("{}.{}", self.release, self.dev_level)
    }

    /// The stability label with spaces replaced by underscores.
    #[must_use]
    pub fn package_stability(&self) -> String {
        self.dev_status.replace(' ', "_")
    }

    /// The tag of an earlier revision in the same release line.
    #[must_use]
    pub fn tag_for(&self, revision: u32) -> String {
        format!("{}.{revision}", self.release)
    }
}

/// Matches `$NAME = '..'` and `const NAME = '..'` declarations.
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\$|\bconst\s+)([A-Z_]+)\s*=\s*['"]([^'"]*)['"]"#).expect("valid regex")
});

fn extract_field(source: &str, name: &str) -> Result<String> {
    DECLARATION
        .captures_iter(source)
        .find(|captures| captures.get(1).is_some_and(|field| field.as_str() == name))
        .and_then(|captures| captures.get(2))
        .map(|value| value.as_str().to_owned())
        .ok_or_else(|| BuildError::InvalidVersion {
            reason: format!("{name} not declared"),
        })
}
