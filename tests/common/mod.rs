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
#![allow(dead_code)]

use async_trait::async_trait;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use telepresence_ci::command::CommandSpec;
use telepresence_ci::error::CommandError;
use telepresence_ci::host::EnvVars;
use telepresence_ci::host::Host;
use telepresence_ci::host::Platform;
use telepresence_ci::process::Capture;
use telepresence_ci::process::Executor;
use telepresence_ci::process::Outcome;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Run(CommandSpec),
  RemoveDir(PathBuf),
}

impl Call {
  /// `program arg0 arg1 ...`, or `rm <dir>`.
  pub fn summary(&self) -> String {
    match self {
      Call::Run(cmd) => std::iter::once(cmd.program.as_str())
        .chain(cmd.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" "),
      Call::RemoveDir(path) => format!("rm {}", path.display()),
    }
  }

  pub fn command(&self) -> Option<&CommandSpec> {
    match self {
      Call::Run(cmd) => Some(cmd),
      Call::RemoveDir(_) => None,
    }
  }
}

/// Records every call instead of running it. `git describe` answers with
/// `describe`; a command whose summary contains `fail_on.0` exits with
/// `fail_on.1`.
pub struct RecordingExecutor {
  pub calls: Vec<Call>,
  pub describe: String,
  pub fail_on: Option<(String, i32)>,
}

impl RecordingExecutor {
  pub fn new() -> Self {
    RecordingExecutor {
      calls: Vec::new(),
      describe: "v0.9.1\n".to_string(),
      fail_on: None,
    }
  }

  pub fn failing_on(pattern: &str, code: i32) -> Self {
    RecordingExecutor {
      fail_on: Some((pattern.to_string(), code)),
      ..RecordingExecutor::new()
    }
  }

  pub fn summaries(&self) -> Vec<String> {
    self.calls.iter().map(Call::summary).collect()
  }

  pub fn programs(&self) -> Vec<String> {
    self
      .calls
      .iter()
      .map(|c| match c {
        Call::Run(cmd) => cmd.program.clone(),
        Call::RemoveDir(_) => "rm".to_string(),
      })
      .collect()
  }

  pub fn pytest_runs(&self) -> Vec<&CommandSpec> {
    self
      .calls
      .iter()
      .filter_map(Call::command)
      .filter(|c| c.program == "py.test")
      .collect()
  }
}

#[async_trait]
impl Executor for RecordingExecutor {
  async fn execute(&mut self, cmd: &CommandSpec, capture: Capture) -> Result<Outcome, CommandError> {
    let call = Call::Run(cmd.clone());
    let summary = call.summary();
    self.calls.push(call);

    if let Some((pattern, code)) = &self.fail_on {
      if summary.contains(pattern.as_str()) {
        return Ok(Outcome::exited(*code));
      }
    }
    match capture {
      Capture::Stdout => Ok(Outcome::with_stdout(0, self.describe.clone())),
      Capture::Inherit => Ok(Outcome::success()),
    }
  }

  async fn remove_dir_all(&mut self, path: &Path) -> Result<(), CommandError> {
    self.calls.push(Call::RemoveDir(path.to_path_buf()));
    Ok(())
  }
}

/// A directory holding executable stubs, suitable for use as `PATH`.
pub fn fake_bin(names: &[&str]) -> TempDir {
  let dir = tempfile::tempdir().unwrap();
  for name in names {
    write_script(dir.path(), name, "#!/bin/sh\nexit 0\n");
  }
  dir
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, body).unwrap();
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  }
  path
}

pub fn host_with(platform: Platform, vars: &[(&str, &str)]) -> Host {
  let vars: EnvVars = vars
    .iter()
    .map(|(k, v)| (OsString::from(*k), OsString::from(*v)))
    .collect();
  Host::new(platform, vars, PathBuf::from("/work"))
}

/// A Linux host whose `PATH` contains `kubectl`.
pub fn host_with_kubectl(bin: &TempDir, extra: &[(&str, &str)]) -> Host {
  let path = bin.path().display().to_string();
  let mut vars = vec![("PATH", path.as_str())];
  vars.extend_from_slice(extra);
  host_with(Platform::Linux, &vars)
}
