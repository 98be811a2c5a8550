//! Tests for packager CLI parsing.

use super::*;
use rstest::rstest;

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["joomla-build"]);
    assert_eq!(cli, Cli::default());
}

#[test]
fn cli_parses_repo_and_config() {
    let cli = Cli::parse_from([
        "joomla-build",
        "--repo",
        "/srv/joomla",
        "--config",
        "/etc/packager.toml",
    ]);
    assert_eq!(cli.repo, Some(Utf8PathBuf::from("/srv/joomla")));
    assert_eq!(cli.config, Some(Utf8PathBuf::from("/etc/packager.toml")));
}

#[test]
fn cli_rejects_verbose_with_quiet() {
    let result = Cli::try_parse_from(["joomla-build", "-v", "-q"]);
    assert!(result.is_err());
}

#[test]
fn cli_rejects_positional_arguments() {
    let result = Cli::try_parse_from(["joomla-build", "3.2.1"]);
    assert!(result.is_err());
}

#[rstest]
#[case::quiet(&["joomla-build", "-q"], log::LevelFilter::Error)]
#[case::default(&["joomla-build"], log::LevelFilter::Warn)]
#[case::verbose(&["joomla-build", "-v"], log::LevelFilter::Info)]
#[case::very_verbose(&["joomla-build", "-vv"], log::LevelFilter::Debug)]
#[case::trace(&["joomla-build", "-vvv"], log::LevelFilter::Trace)]
fn log_level_follows_flags(#[case] args: &[&str], #[case] expected: log::LevelFilter) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.log_level(), expected);
}
