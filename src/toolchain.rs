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
use crate::host::Host;
use crate::process::Executor;
use crate::process::check_call;
use crate::settings::Settings;

/// Linter installed into the virtualenv ahead of everything else.
pub const LINTER_PACKAGE: &str = "flake8";

/// sshuttle fork with the LLMNR fixes; no upstream release carries them yet.
pub const SSHUTTLE_SOURCE: &str = "git+https://github.com/datawire/sshuttle.git@llmnr";

/// `pip install` argument lists, in install order.
pub fn install_steps() -> Vec<Vec<&'static str>> {
  vec![
    vec![LINTER_PACKAGE],
    vec!["-r", "dev-requirements.txt"],
    vec!["-r", "k8s-proxy/requirements.txt"],
    vec![SSHUTTLE_SOURCE],
    vec!["-e", "."],
  ]
}

/// Every command that rebuilds the virtualenv, after the directory itself
/// has been removed.
pub fn virtualenv_commands(settings: &Settings, host: &Host) -> Vec<CommandSpec> {
  let venv = host.absolute(&settings.virtualenv_dir);
  let pip = host.absolute(&settings.virtualenv_bin()).join("pip");
  let pip = pip.display().to_string();

  let create = CommandSpec::new("virtualenv").args([
    format!("--python={}", settings.python),
    venv.display().to_string(),
  ]);

  std::iter::once(create)
    .chain(
      install_steps()
        .into_iter()
        .map(|step| CommandSpec::new(pip.clone()).arg("install").args(step)),
    )
    .collect()
}

/// Deletes and recreates the virtualenv, then installs all dependencies.
pub async fn setup_virtualenv<E: Executor + ?Sized>(
  exec: &mut E,
  settings: &Settings,
  host: &Host,
) -> Result<(), CommandError> {
  let venv = host.absolute(&settings.virtualenv_dir);
  tracing::info!(path = %venv.display(), "Recreating virtualenv");
  exec.remove_dir_all(&venv).await?;

  for cmd in virtualenv_commands(settings, host) {
    check_call(exec, &cmd).await?;
  }
  Ok(())
}

/// The static-analysis commands, in the order they run.
pub fn lint_commands() -> Vec<CommandSpec> {
  vec![
    CommandSpec::new("flake8").args([
      "--isolated",
      "cli/telepresence",
      "local-docker/entrypoint.py",
      "k8s-proxy/forwarder.py",
      "k8s-proxy/socks.py",
    ]),
    CommandSpec::new("flake8").args(["--isolated", "tests"]),
    CommandSpec::new("yapf").args(["--diff", "--recursive", "cli", "tests", "k8s-proxy", "local-docker"]),
    CommandSpec::new("pylint").args(["--rcfile=.pylintrc", "-E", "cli/telepresence"]),
    CommandSpec::new("mypy").args(["--ignore-missing-imports", "cli/telepresence"]),
  ]
}

/// Runs each linter in turn; the first failure aborts.
pub async fn run_linters<E: Executor + ?Sized>(exec: &mut E) -> Result<(), CommandError> {
  for cmd in lint_commands() {
    tracing::info!(linter = %cmd.program, "Linting");
    check_call(exec, &cmd).await?;
  }
  Ok(())
}
