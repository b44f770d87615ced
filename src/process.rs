// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::command::CommandSpec;
use crate::error::CommandError;
use crate::host::EnvVars;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// What to do with the child's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
  /// Stream straight to our own stdout.
  Inherit,
  /// Collect stdout and hand it back in the [`Outcome`].
  Stdout,
}

/// The result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  /// `None` if the child was killed by a signal.
  pub code: Option<i32>,
  /// Present only for [`Capture::Stdout`].
  pub stdout: Option<Vec<u8>>,
}

impl Outcome {
  pub fn success() -> Self {
    Outcome {
      code: Some(0),
      stdout: None,
    }
  }

  pub fn exited(code: i32) -> Self {
    Outcome {
      code: Some(code),
      stdout: None,
    }
  }

  pub fn with_stdout(code: i32, stdout: impl Into<Vec<u8>>) -> Self {
    Outcome {
      code: Some(code),
      stdout: Some(stdout.into()),
    }
  }
}

/// The single choke point through which every external command runs.
#[async_trait]
pub trait Executor: Send {
  /// Runs `cmd` to completion. Only failure to launch is an error here;
  /// exit codes are reported in the [`Outcome`].
  async fn execute(&mut self, cmd: &CommandSpec, capture: Capture) -> Result<Outcome, CommandError>;

  /// Recursively removes `path`. A missing directory counts as removed.
  async fn remove_dir_all(&mut self, path: &Path) -> Result<(), CommandError>;
}

/// Runs `cmd` and turns a nonzero exit into [`CommandError::Failed`].
pub async fn check_call<E: Executor + ?Sized>(exec: &mut E, cmd: &CommandSpec) -> Result<(), CommandError> {
  let outcome = exec.execute(cmd, Capture::Inherit).await?;
  ensure_success(cmd, &outcome)
}

/// Runs `cmd`, requiring success, and returns its stdout decoded as UTF-8.
pub async fn check_output<E: Executor + ?Sized>(
  exec: &mut E,
  cmd: &CommandSpec,
) -> Result<String, CommandError> {
  let outcome = exec.execute(cmd, Capture::Stdout).await?;
  ensure_success(cmd, &outcome)?;
  String::from_utf8(outcome.stdout.unwrap_or_default()).map_err(|source| CommandError::NonUtf8Output {
    command: cmd.command_line(),
    source,
  })
}

fn ensure_success(cmd: &CommandSpec, outcome: &Outcome) -> Result<(), CommandError> {
  match outcome.code {
    Some(0) => Ok(()),
    Some(code) => {
      tracing::error!(code, command = %cmd, "Command failed");
      Err(CommandError::Failed {
        command: cmd.command_line(),
        code,
      })
    }
    None => {
      tracing::error!(command = %cmd, "Command terminated by signal");
      Err(CommandError::Terminated {
        command: cmd.command_line(),
      })
    }
  }
}

/// Executes commands for real, with stdio inherited from this process.
///
/// Children get `base_env` (the sanitized host snapshot) plus the command's
/// own overlay, with overlay keys winning; the orchestrator's own environment
/// is never modified.
pub struct SystemExecutor {
  base_env: EnvVars,
}

impl SystemExecutor {
  pub fn new(base_env: EnvVars) -> Self {
    SystemExecutor { base_env }
  }
}

#[async_trait]
impl Executor for SystemExecutor {
  async fn execute(&mut self, cmd: &CommandSpec, capture: Capture) -> Result<Outcome, CommandError> {
    println!("{}", cmd.command_line());

    let mut child = Command::new(&cmd.program);
    child
      .args(&cmd.args)
      .env_clear()
      .envs(&self.base_env)
      .envs(&cmd.env)
      .stdin(Stdio::inherit())
      .stderr(Stdio::inherit())
      .kill_on_drop(true);

    tracing::debug!(cmd = ?child, "Spawning");
    let spawn_err = |source| CommandError::Spawn {
      command: cmd.command_line(),
      source,
    };

    match capture {
      Capture::Inherit => {
        let status = child.stdout(Stdio::inherit()).status().await.map_err(spawn_err)?;
        Ok(Outcome {
          code: status.code(),
          stdout: None,
        })
      }
      Capture::Stdout => {
        let output = child.stdout(Stdio::piped()).output().await.map_err(spawn_err)?;
        Ok(Outcome {
          code: output.status.code(),
          stdout: Some(output.stdout),
        })
      }
    }
  }

  async fn remove_dir_all(&mut self, path: &Path) -> Result<(), CommandError> {
    println!("rm -rf {}", path.display());
    match tokio::fs::remove_dir_all(path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "Nothing to remove");
        Ok(())
      }
      Err(source) => Err(CommandError::RemoveDir {
        path: path.to_path_buf(),
        source,
      }),
    }
  }
}

/// Prints every command without running it.
///
/// Captured commands (read-only queries such as `git describe`) are still
/// delegated to `inner`, so derived values stay real.
pub struct DryRunExecutor<E> {
  inner: E,
}

impl<E: Executor> DryRunExecutor<E> {
  pub fn new(inner: E) -> Self {
    DryRunExecutor { inner }
  }
}

#[async_trait]
impl<E: Executor> Executor for DryRunExecutor<E> {
  async fn execute(&mut self, cmd: &CommandSpec, capture: Capture) -> Result<Outcome, CommandError> {
    match capture {
      Capture::Stdout => self.inner.execute(cmd, capture).await,
      Capture::Inherit => {
        println!("[dry-run] {}", cmd.command_line());
        Ok(Outcome::success())
      }
    }
  }

  async fn remove_dir_all(&mut self, path: &Path) -> Result<(), CommandError> {
    println!("[dry-run] rm -rf {}", path.display());
    Ok(())
  }
}
