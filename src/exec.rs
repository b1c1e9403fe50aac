//! Subprocess Execution
//!
//! Narrow seam around the external `mt` and `dd` binaries. The extraction
//! engine is the only production caller; tests substitute a scripted mock.

use std::process::Command;
use tracing::{error, info};

/// Synthetic exit code reported when the child process could not be
/// spawned at all (binary missing, permissions).
pub const EXIT_SPAWN_FAILED: i32 = -99;

/// Captured result of one child-process invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Blocking child-process execution.
///
/// Each call runs the child to completion and captures its exit code,
/// stdout and stderr. There is no timeout: a hung tape drive hangs the
/// run. Spawn failures are folded into the exit code rather than raised,
/// so callers handle exactly one failure channel.
pub trait CommandRunner {
    fn execute(&self, program: &str, args: &[String]) -> CommandOutput;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn execute(&self, program: &str, args: &[String]) -> CommandOutput {
        (**self).execute(program, args)
    }
}

/// Production runner backed by `std::process::Command`.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn execute(&self, program: &str, args: &[String]) -> CommandOutput {
        info!("Command: {} {}", program, args.join(" "));

        let output = match Command::new(program).args(args).output() {
            Ok(output) => CommandOutput {
                // Death by signal carries no exit code; report -1.
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => {
                error!("Failed to launch {}: {}", program, e);
                CommandOutput {
                    exit_code: EXIT_SPAWN_FAILED,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        };

        info!("{} status: {}", program, output.exit_code);
        if !output.stdout.is_empty() {
            info!("{} stdout:\n{}", program, output.stdout.trim_end());
        }
        if !output.stderr.is_empty() {
            info!("{} stderr:\n{}", program, output.stderr.trim_end());
        }

        output
    }
}
