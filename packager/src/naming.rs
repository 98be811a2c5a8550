//! Archive naming policy for distribution packages.
//!
//! Patch packages are named
//! `Joomla_<release>.<from>_to_<full>-<stability>-Patch_Package.<ext>`, where
//! `<from>` is `x` for revision 0 because that archive upgrades any earlier
//! maintenance release. Full and update packages are named
//! `Joomla_<full>-<stability>-Full_Package.<ext>` and
//! `Joomla_<full>-<stability>-Update_Package.<ext>`.

use crate::version::Version;
use std::fmt;

/// The fixed prefix for all package names.
const PACKAGE_PREFIX: &str = "Joomla_";

/// Output formats, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// A bzip2-compressed tarball.
    TarBz2,
    /// A gzip-compressed tarball.
    TarGz,
    /// A deflate-compressed zip archive.
    Zip,
}

impl ArchiveFormat {
    /// All formats, in emission order.
    pub const ALL: [Self; 3] = [Self::TarBz2, Self::TarGz, Self::Zip];

    /// The file extension without a leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarBz2 => "tar.bz2",
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What a package contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageKind {
    /// Files changed since `from_revision`, plus the anchors.
    Patch {
        /// The earlier maintenance revision.
        from_revision: u32,
    },
    /// The whole pruned tree.
    Full,
    /// The whole pruned tree without the installer.
    Update,
}

/// The base name of a package, without format extension.
///
/// # Examples
///
/// ```
/// use joomla_build::naming::{ArchiveFormat, PackageKind, PackageName};
/// use joomla_build::version::Version;
///
/// let version = Version::new("3.2", 1, "Stable");
/// let name = PackageName::new(&version, PackageKind::Patch { from_revision: 0 });
/// assert_eq!(
///     name.filename(ArchiveFormat::TarGz),
///     "Joomla_3.2.x_to_3.2.1-Stable-Patch_Package.tar.gz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName {
    release: String,
    full_version: String,
    stability: String,
    kind: PackageKind,
}

impl PackageName {
    /// Creates the name of a `kind` package for `version`.
    #[must_use]
    pub fn new(version: &Version, kind: PackageKind) -> Self {
        Self {
            release: version.release().to_owned(),
            full_version: version.full_version(),
            stability: version.package_stability(),
            kind,
        }
    }

    /// The file name for `format`.
    #[must_use]
    pub fn filename(&self, format: ArchiveFormat) -> String {
        format!("{self}.{format}")
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PackageKind::Patch { from_revision } => {
                let from = from_label(from_revision);
                write!(
                    f,
                    "{PACKAGE_PREFIX}{}.{from}_to_{}-{}-Patch_Package",
                    self.release, self.full_version, self.stability
                )
            }
            PackageKind::Full => write!(
                f,
                "{PACKAGE_PREFIX}{}-{}-Full_Package",
                self.full_version, self.stability
            ),
            PackageKind::Update => write!(
                f,
                "{PACKAGE_PREFIX}{}-{}-Update_Package",
                self.full_version, self.stability
            ),
        }
    }
}

fn from_label(revision: u32) -> String {
    if revision == 0 {
        "x".to_owned()
    } else {
        revision.to_string()
    }
}
