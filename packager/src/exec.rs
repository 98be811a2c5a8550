//! External command execution.
//!
//! All processes the packager spawns (git and the `which` lookup) go through
//! [`CommandExecutor`] so that tests can replay canned output instead of
//! touching a real repository.

use crate::error::{BuildError, Result};
use log::trace;
use std::process::{Command, Output};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joomla_build::exec::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("git", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), joomla_build::error::BuildError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        trace!("running {cmd} {}", args.join(" "));
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(BuildError::from)
    }
}

/// Returns the trimmed stderr of a finished command.
pub(crate) fn stderr_message(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_owned()
}
