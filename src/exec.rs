//! External command execution.
//!
//! Every invocation of the wrapped tool goes through [`CommandRunner`] with
//! an explicit program, argument list, and working directory. Command
//! lines are never assembled as shell strings, so paths and branch names
//! need no quoting.
//!
//! A well-formed command that exits non-zero is not an error here: its
//! captured output is returned as-is and failure shows up only through the
//! text (or the absence of the expected content). The single hard failure
//! is a program that cannot be spawned at all.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Error from a [`CommandRunner`].
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be found or started.
    #[error("{program} executable not found or not runnable")]
    ToolNotFound { program: String },

    /// Any other I/O failure while talking to the subprocess.
    #[error("failed to run {program}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs an external command synchronously and returns its buffered
/// standard output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String, ExecError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String, ExecError> {
        debug!("{} {} (cwd: {})", program, args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExecError::ToolNotFound {
                    program: program.to_string(),
                },
                _ => ExecError::Io {
                    program: program.to_string(),
                    source: e,
                },
            })?;

        if !output.status.success() {
            // Non-zero exits surface only through the captured text.
            debug!(
                "{} exited with {:?}: {}",
                program,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
