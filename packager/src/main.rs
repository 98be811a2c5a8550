//! Joomla release packager CLI entrypoint.
//!
//! Resolves the repository and configuration, then builds every package for
//! the version recorded in the tree. Progress goes to stderr unless `--quiet`
//! is given; any failure is reported there with exit status 1.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use joomla_build::archive::NativeArchiveWriter;
use joomla_build::cli::Cli;
use joomla_build::config::{PackagerConfig, discover_repo_root};
use joomla_build::error::{BuildError, Result};
use joomla_build::exec::SystemCommandExecutor;
use joomla_build::output::write_line;
use joomla_build::release::{self, ReleaseContext};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut stderr = std::io::stderr();
    let run_result = if cli.quiet {
        run(&cli, &mut std::io::sink())
    } else {
        run(&cli, &mut stderr)
    };
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, progress: &mut dyn Write) -> Result<()> {
    let cwd = current_dir()?;
    let (repo_root, config) = resolve_repository(cli, &cwd)?;

    let context = ReleaseContext {
        executor: &SystemCommandExecutor,
        writer: &NativeArchiveWriter,
        config: &config,
        repo_root: &repo_root,
    };
    release::run(&context, progress)?;
    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| BuildError::RepositoryNotFound {
        reason: format!("current directory is not valid UTF-8: {e}"),
    })
}

/// Finds the repository root and loads its configuration.
///
/// Discovery uses the default version file location unless an explicit
/// configuration file overrides it.
fn resolve_repository(cli: &Cli, cwd: &Utf8Path) -> Result<(Utf8PathBuf, PackagerConfig)> {
    let explicit = match cli.config.as_deref() {
        Some(path) => Some(PackagerConfig::load(cwd, Some(path))?),
        None => None,
    };
    let version_file = explicit
        .as_ref()
        .map_or_else(|| PackagerConfig::default().version_file, |c| c.version_file.clone());

    let repo_root = discover_repo_root(cwd, cli.repo.as_deref(), &version_file)?;
    let config = match explicit {
        Some(config) => config,
        None => PackagerConfig::load(&repo_root, None)?,
    };
    Ok((repo_root, config))
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format!("error: {err}"));
            1
        }
    }
}
