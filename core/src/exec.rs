//! Process execution for external tools. Commands are spawned directly from an
//! argument vector, never through a shell.

use crate::error::ToolError;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{error, info};

/// Program plus explicit arguments, with optional data written to stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand { program: program.into(), args: Vec::new(), stdin: None }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd
    }

    fn spawn(&self, mut cmd: Command) -> Result<Child, ToolError> {
        let mut child = cmd
            .spawn()
            .map_err(|source| ToolError::Spawn { command: self.to_string(), source })?;
        if let (Some(input), Some(mut pipe)) = (self.stdin.clone(), child.stdin.take()) {
            // Fed from its own task so a child that never reads stdin cannot stall
            // the caller's wait (or its timeout). A broken pipe is not our failure.
            tokio::spawn(async move {
                let _ = pipe.write_all(input.as_bytes()).await;
                let _ = pipe.write_all(b"\n").await;
            });
        }
        Ok(child)
    }

    fn check(&self, status: std::process::ExitStatus) -> Result<(), ToolError> {
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit { command: self.to_string(), status })
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {}", a)?;
        }
        Ok(())
    }
}

/// Run `cmd` with stdout redirected into `dest`. The file is created (or
/// truncated) before the process is spawned, so it exists even when the tool fails.
pub async fn run_to_file(cmd: &ToolCommand, dest: &Path) -> Result<(), ToolError> {
    let file = std::fs::File::create(dest)
        .map_err(|source| ToolError::Io { path: dest.to_path_buf(), source })?;
    let mut command = cmd.command();
    command.stdout(Stdio::from(file)).stderr(Stdio::null());
    let mut child = cmd.spawn(command)?;
    let status = child
        .wait()
        .await
        .map_err(|source| ToolError::Spawn { command: cmd.to_string(), source })?;
    cmd.check(status)
}

/// Non-failing wrapper around [`run_to_file`]: logs the outcome and reports
/// whether the tool succeeded.
pub async fn execute(cmd: &ToolCommand, dest: &Path) -> bool {
    match run_to_file(cmd, dest).await {
        Ok(()) => {
            info!("Finished: {}", cmd);
            true
        }
        Err(e) => {
            error!("Error while running command: {}\n{}", cmd, e);
            false
        }
    }
}

/// Run `cmd` and return its stdout as text. With a `limit`, the child is killed
/// once the limit elapses and [`ToolError::Timeout`] is returned.
pub async fn capture(cmd: &ToolCommand, limit: Option<Duration>) -> Result<String, ToolError> {
    let mut command = cmd.command();
    command.stdout(Stdio::piped()).stderr(Stdio::null()).kill_on_drop(true);
    let child = cmd.spawn(command)?;
    let waited = match limit {
        Some(after) => timeout(after, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout { command: cmd.to_string(), after })?,
        None => child.wait_with_output().await,
    };
    let output = waited.map_err(|source| ToolError::Spawn { command: cmd.to_string(), source })?;
    cmd.check(output.status)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `cmd` with stdout passed through to the terminal, for tools that write
/// their own output file.
pub async fn status(cmd: &ToolCommand) -> Result<(), ToolError> {
    let mut command = cmd.command();
    command.stdout(Stdio::inherit()).stderr(Stdio::null());
    let mut child = cmd.spawn(command)?;
    let status = child
        .wait()
        .await
        .map_err(|source| ToolError::Spawn { command: cmd.to_string(), source })?;
    cmd.check(status)
}
