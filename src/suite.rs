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
use crate::cli::Method;
use crate::command::CommandSpec;
use crate::config::RunConfig;
use crate::error::CommandError;
use crate::host::Host;
use crate::process::Executor;
use crate::process::check_call;
use crate::settings::Settings;
use std::collections::BTreeMap;
use tracing::Instrument;

/// Set when the cluster under test is OpenShift, which cannot take
/// concurrent Telepresence sessions.
pub const TELEPRESENCE_OPENSHIFT: &str = "TELEPRESENCE_OPENSHIFT";
pub const TELEPRESENCE_REGISTRY: &str = "TELEPRESENCE_REGISTRY";
pub const TELEPRESENCE_VERSION: &str = "TELEPRESENCE_VERSION";
pub const TELEPRESENCE_METHOD: &str = "TELEPRESENCE_METHOD";
pub const SCOUT_DISABLE: &str = "SCOUT_DISABLE";

/// Test modules run once per method.
pub const METHOD_SUITES: [&str; 2] = ["tests/test_run.py", "tests/test_endtoend.py"];

/// Keeps the general run from repeating the per-method module.
pub const GENERAL_FILTER: &str = "not test_run";

pub type TestEnv = BTreeMap<String, String>;

/// How many py.test workers to use.
///
/// Two independent caps can force a serial run: an OpenShift cluster, and a
/// method that holds an exclusive resource (the VPN, or the container
/// method's leak detection).
pub fn parallelism(max_processes: u32, method: Option<Method>, openshift: bool) -> u32 {
  let mut n = max_processes.max(1);
  if openshift {
    n = 1;
  }
  if method.is_some_and(Method::requires_serial) {
    n = 1;
  }
  n
}

/// Environment overlay for a py.test run. Only per-method runs carry
/// `TELEPRESENCE_METHOD`.
pub fn test_env(config: &RunConfig, version: &str, method: Option<Method>) -> TestEnv {
  let mut env = TestEnv::new();
  if let Some(registry) = &config.registry {
    env.insert(TELEPRESENCE_REGISTRY.to_string(), registry.clone());
  }
  env.insert(TELEPRESENCE_VERSION.to_string(), version.to_string());
  env.insert(SCOUT_DISABLE.to_string(), "1".to_string());
  if let Some(method) = method {
    env.insert(TELEPRESENCE_METHOD.to_string(), method.to_string());
  }
  env.extend(config.extra_test_env.iter().map(|(k, v)| (k.clone(), v.clone())));
  env
}

/// Refreshes cached sudo credentials so prompts don't get lost in test output.
pub fn sudo_refresh_command() -> CommandSpec {
  CommandSpec::new("sudo").arg("true")
}

fn pytest_base(settings: &Settings, processes: u32) -> CommandSpec {
  CommandSpec::new("py.test").args([
    "-v".to_string(),
    format!("--timeout={}", settings.test_timeout_secs),
    "--timeout_method=thread".to_string(),
    format!("--numprocesses={processes}"),
  ])
}

/// The py.test invocation for one method.
pub fn method_command(config: &RunConfig, settings: &Settings, host: &Host, version: &str, method: Method) -> CommandSpec {
  let processes = parallelism(settings.max_processes, Some(method), is_openshift(host));
  pytest_base(settings, processes)
    .args(config.extra_test_args.iter().cloned())
    .args(METHOD_SUITES)
    .envs(&test_env(config, version, Some(method)))
}

/// The py.test invocation for everything not covered by the method runs.
pub fn general_command(config: &RunConfig, settings: &Settings, host: &Host, version: &str) -> CommandSpec {
  let processes = parallelism(settings.max_processes, None, is_openshift(host));
  pytest_base(settings, processes)
    .args(config.extra_test_args.iter().cloned())
    .args(["-k", GENERAL_FILTER, "tests"])
    .envs(&test_env(config, version, None))
}

fn is_openshift(host: &Host) -> bool {
  host.var(TELEPRESENCE_OPENSHIFT).is_some()
}

/// Runs the per-method suites in order, then the general suite once.
/// Stops at the first failing run.
pub async fn run_tests<E: Executor + ?Sized>(
  exec: &mut E,
  config: &RunConfig,
  settings: &Settings,
  host: &Host,
  version: &str,
) -> Result<(), CommandError> {
  for &method in &config.methods {
    run_method(exec, config, settings, host, version, method)
      .instrument(tracing::info_span!("test_method", %method))
      .await?;
  }

  tracing::info!("Running general tests");
  check_call(exec, &general_command(config, settings, host, version))
    .instrument(tracing::info_span!("test_general"))
    .await
}

async fn run_method<E: Executor + ?Sized>(
  exec: &mut E,
  config: &RunConfig,
  settings: &Settings,
  host: &Host,
  version: &str,
  method: Method,
) -> Result<(), CommandError> {
  tracing::info!("Running end-to-end tests with method {}", method);
  check_call(exec, &sudo_refresh_command()).await?;
  check_call(exec, &method_command(config, settings, host, version, method)).await
}
