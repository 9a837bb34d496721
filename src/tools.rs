//! External tool invocation
//!
//! Every subprocess runs to completion with its output captured. A non-zero
//! exit status becomes [`DeployError::Tool`] carrying the exit code and the
//! combined output, so a failing tool stops whatever pipeline called it.

use crate::{DeployError, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Captured result of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Run `program` with `args`, optionally inside `cwd`
pub fn run<I, S>(program: impl AsRef<OsStr>, args: I, cwd: Option<&Path>) -> Result<ToolOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program.as_ref());
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    run_command(&mut command)
}

pub fn run_command(command: &mut Command) -> Result<ToolOutput> {
    let tool = command.get_program().to_string_lossy().to_string();
    debug!(command = ?command, "Running external tool");

    let output = command.output().map_err(|e| {
        DeployError::tool(&tool, None, format!("failed to start: {}", e))
    })?;

    let captured = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !output.status.success() {
        warn!(tool = %tool, status = ?output.status.code(), "External tool failed");
        return Err(DeployError::tool(tool, output.status.code(), captured.combined()));
    }

    Ok(captured)
}
