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
mod common;

use common::host_with;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use telepresence_ci::cli::Method;
use telepresence_ci::config::RunConfig;
use telepresence_ci::host::Platform;
use telepresence_ci::images;
use telepresence_ci::settings::Settings;
use telepresence_ci::suite;
use telepresence_ci::suite::parallelism;
use telepresence_ci::toolchain;

fn config() -> RunConfig {
  RunConfig {
    manage_virtualenv: false,
    lint: false,
    registry: Some("datawire".to_string()),
    build_and_push: true,
    version_suffix: String::new(),
    methods: vec![Method::InjectTcp],
    run_tests: true,
    extra_test_args: Vec::new(),
    extra_test_env: BTreeMap::new(),
  }
}

#[test]
fn test_exclusive_methods_run_serially() {
  for method in [Method::VpnTcp, Method::Container] {
    assert_eq!(parallelism(4, Some(method), false), 1);
    assert_eq!(parallelism(4, Some(method), true), 1);
  }
}

#[test]
fn test_inject_tcp_uses_full_parallelism_unless_openshift() {
  assert_eq!(parallelism(4, Some(Method::InjectTcp), false), 4);
  assert_eq!(parallelism(4, Some(Method::InjectTcp), true), 1);
  assert_eq!(parallelism(4, None, false), 4);
  assert_eq!(parallelism(4, None, true), 1);
}

#[test]
fn test_parallelism_never_drops_to_zero() {
  assert_eq!(parallelism(0, None, false), 1);
}

#[test]
fn test_env_for_method_and_general_runs() {
  let mut config = config();
  config
    .extra_test_env
    .insert("GOOGLE_APPLICATION_CREDENTIALS".to_string(), "/k.json".to_string());

  let method_env = suite::test_env(&config, "v1", Some(Method::VpnTcp));
  let general_env = suite::test_env(&config, "v1", None);

  assert_eq!(method_env["TELEPRESENCE_METHOD"], "vpn-tcp");
  assert!(!general_env.contains_key("TELEPRESENCE_METHOD"));
  for env in [&method_env, &general_env] {
    assert_eq!(env["TELEPRESENCE_REGISTRY"], "datawire");
    assert_eq!(env["TELEPRESENCE_VERSION"], "v1");
    assert_eq!(env["SCOUT_DISABLE"], "1");
    assert_eq!(env["GOOGLE_APPLICATION_CREDENTIALS"], "/k.json");
  }
}

#[test]
fn test_env_omits_unknown_registry() {
  let mut config = config();
  config.registry = None;

  let env = suite::test_env(&config, "v1", None);

  assert!(!env.contains_key("TELEPRESENCE_REGISTRY"));
}

#[test]
fn test_method_command_line() {
  let host = host_with(Platform::Linux, &[]);
  let cmd = suite::method_command(&config(), &Settings::default(), &host, "v1", Method::InjectTcp);

  assert_eq!(
    cmd.command_line(),
    "SCOUT_DISABLE=1 TELEPRESENCE_METHOD=inject-tcp TELEPRESENCE_REGISTRY=datawire \
     TELEPRESENCE_VERSION=v1 py.test -v --timeout=360 --timeout_method=thread \
     --numprocesses=4 tests/test_run.py tests/test_endtoend.py"
  );
}

#[test]
fn test_general_command_honours_timeout_setting() {
  let host = host_with(Platform::Linux, &[]);
  let settings = Settings {
    test_timeout_secs: 60,
    ..Settings::default()
  };
  let cmd = suite::general_command(&config(), &settings, &host, "v1");

  assert_eq!(
    cmd.args,
    vec![
      "-v",
      "--timeout=60",
      "--timeout_method=thread",
      "--numprocesses=4",
      "-k",
      "not test_run",
      "tests"
    ]
  );
}

#[test]
fn test_image_tags() {
  assert_eq!(
    images::LOCAL_IMAGE.tag("gcr.io/p", "v1-LNX-5"),
    "gcr.io/p/telepresence-local:v1-LNX-5"
  );
  assert_eq!(
    images::K8S_IMAGE.build_command("r", "v1").args,
    vec!["build", "k8s-proxy", "-t", "r/telepresence-k8s:v1"]
  );
}

#[test]
fn test_virtualenv_install_order() {
  let host = host_with(Platform::Linux, &[]);
  let cmds = toolchain::virtualenv_commands(&Settings::default(), &host);
  let lines: Vec<String> = cmds.iter().map(|c| c.command_line()).collect();

  assert_eq!(
    lines,
    vec![
      "virtualenv --python=python3 /work/virtualenv",
      "/work/virtualenv/bin/pip install flake8",
      "/work/virtualenv/bin/pip install -r dev-requirements.txt",
      "/work/virtualenv/bin/pip install -r k8s-proxy/requirements.txt",
      "/work/virtualenv/bin/pip install git+https://github.com/datawire/sshuttle.git@llmnr",
      "/work/virtualenv/bin/pip install -e .",
    ]
  );
}

#[test]
fn test_five_linters() {
  let programs: Vec<String> = toolchain::lint_commands()
    .into_iter()
    .map(|c| c.program)
    .collect();

  assert_eq!(programs, vec!["flake8", "flake8", "yapf", "pylint", "mypy"]);
}
