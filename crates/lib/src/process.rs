//! External tool execution.
//!
//! Runs a program with an explicit argument vector (no shell), in a given
//! working directory, with a reproducibility-oriented environment layered
//! on top of the caller's.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::SOURCE_DATE_EPOCH;

/// Lines of tool output kept in an error.
const OUTPUT_TAIL_LINES: usize = 40;

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("failed to start `{program}`: {source}")]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("`{cmd}` failed with exit code {code:?}\n{output}")]
  Failed {
    cmd: String,
    code: Option<i32>,
    output: String,
  },
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Run `program` with `args` in `cwd`.
///
/// The caller's environment is kept (build tools need `PATH`), but
/// `SOURCE_DATE_EPOCH` and a C locale are forced so timestamps and messages
/// do not vary between runs.
pub async fn run_tool(program: &Path, args: &[OsString], cwd: &Path) -> Result<ToolOutput, ToolError> {
  let cmd = display_command(program, args);
  info!(cmd = %cmd, "executing command");

  let mut command = Command::new(program);
  command
    .args(args)
    .current_dir(cwd)
    .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH)
    .env("LANG", "C")
    .env("LC_ALL", "C")
    .kill_on_drop(true);

  debug!(working_dir = ?cwd, "spawning process");

  let output = command.output().await.map_err(|source| ToolError::Spawn {
    program: program.to_path_buf(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
  let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command stdout");
  }
  if !stderr.is_empty() {
    debug!(stderr = %stderr, "command stderr");
  }

  if !output.status.success() {
    // Compilers report on stderr; some generators route everything to stdout
    let source = if stderr.trim().is_empty() { &stdout } else { &stderr };
    return Err(ToolError::Failed {
      cmd,
      code: output.status.code(),
      output: tail(source, OUTPUT_TAIL_LINES),
    });
  }

  Ok(ToolOutput { stdout, stderr })
}

/// Render a command line for logs and errors.
pub fn display_command(program: &Path, args: &[OsString]) -> String {
  let mut parts = vec![program.display().to_string()];
  for arg in args {
    let arg = arg.to_string_lossy();
    if arg.contains(' ') {
      parts.push(format!("\"{}\"", arg));
    } else {
      parts.push(arg.into_owned());
    }
  }
  parts.join(" ")
}

fn tail(text: &str, lines: usize) -> String {
  let all: Vec<&str> = text.trim_end().lines().collect();
  let start = all.len().saturating_sub(lines);
  all[start..].join("\n")
}
