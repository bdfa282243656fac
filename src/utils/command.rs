//! Utilities for running external commands with proper error handling
//!
//! Commands run synchronously to completion. There is no timeout; a hung
//! archiver hangs the run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, error};

/// Locate an executable on PATH (or verify an explicit path)
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    which::which(program).with_context(|| format!("Executable not found: {}", program))
}

/// Run a command, capturing stdout and stderr
///
/// A non-zero exit status is turned into an error carrying stderr.
pub fn run_command(program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    debug!("Running command: {} {}", program, args.join(" "));

    let output = cmd
        .output()
        .context(format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("Command failed: {} {}", program, args.join(" "));
        error!("Stderr: {}", stderr);
        anyhow::bail!(
            "Command failed with exit code {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
        debug!("Command output: {}", stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        debug!("Command stderr: {}", stderr);
    }

    Ok(output)
}
