//! CLI argument definitions for the release packager.
//!
//! Every flag is optional: with none, the packager discovers the repository
//! from the current directory and builds the version recorded there.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build Joomla distribution packages from release tags.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "joomla-build")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build Joomla distribution packages from release tags.\n\n",
    "Reads the version from libraries/cms/version/version.php, extracts the ",
    "matching tag into the scratch directory, writes patch packages against ",
    "earlier maintenance releases, and finally writes the full and update ",
    "packages. Every package is produced as .tar.bz2, .tar.gz, and .zip.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build from the repository root or its build/ directory:\n",
    "    $ joomla-build\n\n",
    "  Build another checkout with a custom configuration:\n",
    "    $ joomla-build --repo ~/src/joomla-cms --config packager.toml\n",
))]
pub struct Cli {
    /// Repository root [default: current directory or its parent].
    #[arg(long, value_name = "DIR")]
    pub repo: Option<Utf8PathBuf>,

    /// Configuration file [default: <repo>/build/packager.toml].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log level filter implied by the verbosity flags.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        match (self.quiet, self.verbosity) {
            (true, _) => log::LevelFilter::Error,
            (false, 0) => log::LevelFilter::Warn,
            (false, 1) => log::LevelFilter::Info,
            (false, 2) => log::LevelFilter::Debug,
            (false, _) => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
