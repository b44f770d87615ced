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
#![cfg(unix)]

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;
use std::path::Path;
use std::path::PathBuf;
use telepresence_ci::command::CommandSpec;
use telepresence_ci::error::CommandError;
use telepresence_ci::host::EnvVars;
use telepresence_ci::host::Host;
use telepresence_ci::host::Platform;
use telepresence_ci::process::Capture;
use telepresence_ci::process::Executor;
use telepresence_ci::process::SystemExecutor;
use telepresence_ci::process::check_call;
use telepresence_ci::process::check_output;

fn host(extra: &[(OsString, OsString)]) -> Host {
  let mut vars: EnvVars = [
    ("PATH", "/usr/bin:/bin"),
    ("TELEPRESENCE_METHOD", "base"),
    ("__PYVENV_LAUNCHER__", "/usr/bin/python3"),
  ]
  .into_iter()
  .map(|(k, v)| (OsString::from(k), OsString::from(v)))
  .collect();
  vars.extend(extra.iter().cloned());
  Host::new(Platform::Linux, vars, PathBuf::from("/work"))
}

fn sh(script: &str) -> CommandSpec {
  CommandSpec::new("/bin/sh").args(["-c", script])
}

#[tokio::test]
async fn test_child_sees_overlay_and_prefixed_path() {
  let host = host(&[]);
  let mut exec = SystemExecutor::new(host.with_path_prefix(Path::new("/work/virtualenv/bin")));

  let mut overlay = BTreeMap::new();
  overlay.insert("TELEPRESENCE_METHOD".to_string(), "vpn-tcp".to_string());
  let cmd = sh(r#"printf '%s' "$TELEPRESENCE_METHOD:$__PYVENV_LAUNCHER__:$PATH""#).envs(&overlay);

  let output = check_output(&mut exec, &cmd).await.unwrap();
  assert_eq!(output, "vpn-tcp::/work/virtualenv/bin:/usr/bin:/bin");
}

#[tokio::test]
async fn test_child_without_overlay_sees_snapshot_value() {
  let host = host(&[]);
  let mut exec = SystemExecutor::new(host.with_path_prefix(Path::new("/work/virtualenv/bin")));

  let output = check_output(&mut exec, &sh(r#"printf '%s' "$TELEPRESENCE_METHOD""#))
    .await
    .unwrap();
  assert_eq!(output, "base");
}

#[tokio::test]
async fn test_child_receives_non_utf8_variables() {
  let latin1 = OsString::from_vec(b"caf\xe9".to_vec());
  let host = host(&[(OsString::from("LC_NAME"), latin1)]);
  let mut exec = SystemExecutor::new(host.with_path_prefix(Path::new("/work/virtualenv/bin")));

  let outcome = exec
    .execute(&sh(r#"printf '%s' "$LC_NAME""#), Capture::Stdout)
    .await
    .unwrap();
  assert_eq!(outcome.code, Some(0));
  assert_eq!(outcome.stdout.unwrap(), b"caf\xe9".to_vec());
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_with_its_code() {
  let mut exec = SystemExecutor::new(host(&[]).vars().clone());

  match check_call(&mut exec, &sh("exit 3")).await {
    Err(CommandError::Failed { code, .. }) => assert_eq!(code, 3),
    other => panic!("expected a failed command, got {other:?}"),
  }
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
  let mut exec = SystemExecutor::new(host(&[]).vars().clone());
  let cmd = CommandSpec::new("/nonexistent/tp-ci-no-such-tool");

  assert!(matches!(
    check_call(&mut exec, &cmd).await,
    Err(CommandError::Spawn { .. })
  ));
}

#[tokio::test]
async fn test_remove_dir_all_tolerates_missing_directory() {
  let temp = tempfile::tempdir().unwrap();
  let venv = temp.path().join("virtualenv");
  std::fs::create_dir_all(venv.join("bin")).unwrap();
  let mut exec = SystemExecutor::new(EnvVars::new());

  exec.remove_dir_all(&venv).await.unwrap();
  assert!(!venv.exists());
  exec.remove_dir_all(&venv).await.unwrap();
}
