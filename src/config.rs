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
use crate::cli::Cli;
use crate::cli::Method;
use crate::error::ConfigError;
use crate::host::Host;
use crate::settings::Settings;
use serde::Serialize;
use std::collections::BTreeMap;

/// Variable that names the GCP project in CI.
pub const PROJECT_NAME: &str = "PROJECT_NAME";

/// Credentials variable handed to the tests in CI mode.
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Executable the end-to-end tests drive the cluster with.
pub const KUBECTL: &str = "kubectl";

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
  pub manage_virtualenv: bool,
  pub lint: bool,
  pub registry: Option<String>,
  pub build_and_push: bool,
  pub version_suffix: String,
  pub methods: Vec<Method>,
  pub run_tests: bool,
  pub extra_test_args: Vec<String>,
  pub extra_test_env: BTreeMap<String, String>,
}

impl RunConfig {
  /// Whether anything will talk to a cluster.
  pub fn wants_cluster(&self) -> bool {
    self.run_tests || !self.methods.is_empty()
  }

  /// Tests consume the pushed images, so asking for tests implies building.
  fn enforce_build_requirement(mut self) -> Self {
    if self.wants_cluster() && !self.build_and_push {
      tracing::info!("Tests were requested, so --build-and-push is implied");
      self.build_and_push = true;
    }
    self
  }
}

/// A way of turning parsed arguments into a [`RunConfig`].
pub trait ConfigStrategy {
  fn build(self, host: &Host, settings: &Settings) -> Result<RunConfig, ConfigError>;
}

/// Takes every value from the command line.
pub struct ExplicitArgs(pub Cli);

impl ConfigStrategy for ExplicitArgs {
  fn build(self, _host: &Host, _settings: &Settings) -> Result<RunConfig, ConfigError> {
    let ExplicitArgs(Cli {
      registry,
      build_and_push,
      version_suffix,
      manage_virtualenv,
      run_tests,
      lint,
      methods,
      test_args,
      ..
    }) = self;

    Ok(RunConfig {
      manage_virtualenv,
      lint,
      registry,
      build_and_push,
      version_suffix,
      methods,
      run_tests,
      extra_test_args: test_args,
      extra_test_env: BTreeMap::new(),
    })
  }
}

/// The fixed CircleCI preset. Only `--no-tests` and the trailing test
/// arguments are honoured from the command line.
pub struct CiDefaults(pub Cli);

impl ConfigStrategy for CiDefaults {
  fn build(self, host: &Host, settings: &Settings) -> Result<RunConfig, ConfigError> {
    let CiDefaults(cli) = self;

    let project = host
      .var(PROJECT_NAME)
      .ok_or(ConfigError::MissingCiVariable { name: PROJECT_NAME })?;

    let mut methods = Vec::with_capacity(3);
    if host.platform().is_linux() {
      methods.push(Method::Container);
    }
    methods.extend([Method::InjectTcp, Method::VpnTcp]);

    let credentials = host.absolute(&settings.credentials_file);
    let mut extra_test_env = BTreeMap::new();
    extra_test_env.insert(
      GOOGLE_APPLICATION_CREDENTIALS.to_string(),
      credentials.display().to_string(),
    );

    Ok(RunConfig {
      manage_virtualenv: false,
      lint: false,
      registry: Some(format!("{}/{}", settings.gcr_host, project)),
      build_and_push: false,
      version_suffix: String::new(),
      methods,
      run_tests: cli.run_tests,
      extra_test_args: cli.test_args,
      extra_test_env,
    })
  }
}

/// Picks the strategy once and applies the invariants shared by both.
pub fn resolve(cli: Cli, host: &Host, settings: &Settings) -> Result<RunConfig, ConfigError> {
  let config = if cli.circle {
    tracing::info!("CI mode: ignoring most command line options");
    CiDefaults(cli).build(host, settings)?
  } else {
    ExplicitArgs(cli).build(host, settings)?
  };
  Ok(config.enforce_build_requirement())
}

/// Checks everything that can be checked before running a single command,
/// returning the registry images will be pushed to.
pub fn check_preconditions<'a>(config: &'a RunConfig, host: &Host) -> Result<&'a str, ConfigError> {
  if config.wants_cluster() && host.find_executable(KUBECTL).is_none() {
    return Err(ConfigError::MissingExecutable { name: KUBECTL });
  }
  config.registry.as_deref().ok_or(ConfigError::MissingRegistry)
}
