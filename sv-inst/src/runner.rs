use std::io;
use std::path::Path;
use std::process::Command;

use log::debug;

/// Exit status and captured output of one tool run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// `-1` when the process was terminated by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Runs an external program to completion.
pub trait Runner: Send + Sync {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput>;
}

/// Runs the program as a child process and buffers its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput> {
        debug!("running {} {}", program.display(), args.join(" "));

        let output = Command::new(program).args(args).output()?;
        let result = ToolOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "{} exited with {} ({} bytes stdout, {} bytes stderr)",
            program.display(),
            result.status,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}
