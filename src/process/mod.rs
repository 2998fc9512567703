//! External process execution
//!
//! This module provides captured-output command execution for the tools
//! jx drives (`helm`, `git`), with environment, working-directory and
//! timeout control.

mod command;

pub use command::{CommandOutput, CommandRunner, ProcessError};
