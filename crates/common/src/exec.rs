//! External command execution.
//!
//! All interactions with external binaries (certbot, nginx, systemctl) go
//! through the [`CommandRunner`] trait. Components hold a trait object and
//! never spawn processes themselves, which keeps every flow deterministic
//! under test: a scripted runner stands in for the real binaries and records
//! the invocations it receives.
//!
//! Invocations are synchronous and blocking with no timeout of their own; a
//! hang in an external tool hangs the whole run. Callers must serialize
//! invocations externally, there is no locking here.

use std::process::Command;

use thiserror::Error;
use tracing::trace;

/// Outcome of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited successfully (exit code zero).
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Errors raised by command execution itself.
///
/// A nonzero exit status is *not* an error at this layer; it is reported
/// through [`CommandOutput::success`]. Only the inability to run the program
/// at all surfaces here.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be spawned (missing binary, permissions).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Capability for running external commands.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, wait for it to finish, and capture output.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        trace!(program = %program, ?args, "Running external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
