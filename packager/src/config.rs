//! Packager configuration loaded from `build/packager.toml`.
//!
//! Every setting has a default matching the historical Joomla build layout,
//! so the file is optional. Unknown keys are rejected to catch typos before a
//! release is built with the wrong paths.

use crate::error::{BuildError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Location of the configuration file relative to the repository root.
pub const CONFIG_FILE: &str = "build/packager.toml";

/// Settings that control where the packager looks and writes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Absolute path of the git executable that must match `which git`.
    pub git_path: Utf8PathBuf,
    /// Version metadata file, relative to the repository root.
    pub version_file: Utf8PathBuf,
    /// Scratch directory, relative to the repository root. It is deleted and
    /// recreated at the start of every build.
    pub scratch_dir: Utf8PathBuf,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            git_path: Utf8PathBuf::from("/usr/bin/git"),
            version_file: Utf8PathBuf::from("libraries/cms/version/version.php"),
            scratch_dir: Utf8PathBuf::from("build/tmp"),
        }
    }
}

impl PackagerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] if the text is not valid TOML,
    /// contains unknown keys, or names a scratch directory that is not a
    /// subdirectory of the repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use joomla_build::config::PackagerConfig;
    /// use camino::Utf8Path;
    ///
    /// let config = PackagerConfig::parse(
    ///     "git_path = \"/usr/local/bin/git\"",
    ///     Utf8Path::new("packager.toml"),
    /// )?;
    /// assert_eq!(config.git_path, "/usr/local/bin/git");
    /// assert_eq!(config.scratch_dir, "build/tmp");
    /// # Ok::<(), joomla_build::error::BuildError>(())
    /// ```
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| BuildError::InvalidConfig {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        validate_scratch_dir(&config.scratch_dir).map_err(|reason| BuildError::InvalidConfig {
            path: path.to_owned(),
            reason,
        })?;
        Ok(config)
    }

    /// Loads configuration for `repo_root`.
    ///
    /// An explicit path must exist. Without one, `build/packager.toml` is read
    /// when present and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an explicit file cannot be read, or
    /// [`BuildError::InvalidConfig`] if the contents do not parse.
    pub fn load(repo_root: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let candidate = repo_root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    debug!("no {CONFIG_FILE} in {repo_root}; using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        debug!("loading packager configuration from {path}");
        let contents = std::fs::read_to_string(&path)?;
        Self::parse(&contents, &path)
    }

    /// Returns the absolute scratch directory for `repo_root`.
    #[must_use]
    pub fn scratch_path(&self, repo_root: &Utf8Path) -> Utf8PathBuf {
        repo_root.join(&self.scratch_dir)
    }
}

/// The scratch directory is deleted at the start of every build, so it must
/// be a plain relative path strictly below the repository root.
fn validate_scratch_dir(dir: &Utf8Path) -> std::result::Result<(), String> {
    if dir.as_str().is_empty() {
        return Err("scratch_dir must not be empty".to_owned());
    }
    if dir.is_absolute() {
        return Err(format!("scratch_dir {dir} must be relative to the repository"));
    }
    if !dir
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)))
    {
        return Err(format!(
            "scratch_dir {dir} must not contain `.` or `..` components"
        ));
    }
    Ok(())
}

/// Locates the repository root.
///
/// Uses `explicit` when given. Otherwise the current directory is used if it
/// holds the version file, falling back to its parent so the packager can be
/// run from inside `build/`.
///
/// # Errors
///
/// Returns [`BuildError::RepositoryNotFound`] if neither candidate contains
/// the version file.
pub fn discover_repo_root(
    cwd: &Utf8Path,
    explicit: Option<&Utf8Path>,
    version_file: &Utf8Path,
) -> Result<Utf8PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_owned());
    }

    let candidates = std::iter::once(cwd).chain(cwd.parent());
    for candidate in candidates {
        if candidate.join(version_file).is_file() {
            return Ok(candidate.to_owned());
        }
    }

    Err(BuildError::RepositoryNotFound {
        reason: format!("{version_file} not found in {cwd} or its parent"),
    })
}
