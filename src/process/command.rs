//! Command execution with captured output
//!
//! jx shells out to external tools for everything it does not speak a
//! protocol for: `helm` for chart operations and `git` for clone/push
//! plumbing. This module wraps those invocations with:
//!
//! - Environment variable overlay on top of the parent environment
//! - Working directory control
//! - Optional timeout (the child is killed on expiry)
//! - Captured stdout/stderr and wall-clock duration
//!
//! ## Example
//!
//! ```rust,no_run
//! use jx::process::CommandRunner;
//!
//! # async fn demo() -> Result<(), jx::process::ProcessError> {
//! let runner = CommandRunner::new();
//! let output = runner.run_checked("git", &["--version"]).await?;
//! assert!(output.stdout.contains("git version"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

/// Errors from external command execution
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The program exited with a non-zero code
    #[error("'{program}' failed with exit code {code}: {stderr}")]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit code returned by the program.
        code: i32,
        /// Standard error output, trimmed.
        stderr: String,
    },

    /// The program was killed by a signal before exiting
    #[error("'{program}' terminated by signal")]
    Terminated {
        /// Program that was terminated.
        program: String,
    },

    /// The timeout expired before the program finished
    #[error("'{program}' timed out after {timeout:?}")]
    TimedOut {
        /// Program that timed out.
        program: String,
        /// Configured timeout.
        timeout: Duration,
    },
}

/// Captured result of a command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code
    pub exit_code: i32,

    /// Duration of execution
    pub duration: Duration,
}

impl CommandOutput {
    /// Returns true if the command succeeded (exit code 0)
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands with captured output
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Creates a runner inheriting the parent environment and directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory for commands
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Adds an environment variable visible to commands
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets a timeout after which the command is killed
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs a command and captures its output regardless of exit code
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started, is killed by a
    /// signal, or exceeds the configured timeout.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ProcessError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        tracing::debug!("Running: {} {}", program, args.join(" "));

        let start = Instant::now();
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| ProcessError::TimedOut {
                    program: program.to_string(),
                    timeout,
                })?,
            None => cmd.output().await,
        };

        let output = result.map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let exit_code = output.status.code().ok_or_else(|| ProcessError::Terminated {
            program: program.to_string(),
        })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration: start.elapsed(),
        })
    }

    /// Runs a command and fails on a non-zero exit code
    ///
    /// # Errors
    ///
    /// As [`CommandRunner::run`], plus [`ProcessError::Failed`] when the
    /// command exits non-zero. The error carries the trimmed stderr.
    pub async fn run_checked(
        &self,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, ProcessError> {
        let output = self.run(program, args).await?;
        if output.is_success() {
            Ok(output)
        } else {
            Err(ProcessError::Failed {
                program: program.to_string(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}
