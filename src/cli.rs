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
use clap::Parser;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Default template appended to the git tag to form the version.
pub const DEFAULT_VERSION_SUFFIX: &str = "-{OS}-{TIME}";

/// The proxying technique a test run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
  Container,
  InjectTcp,
  VpnTcp,
}

impl Method {
  pub fn as_str(self) -> &'static str {
    match self {
      Method::Container => "container",
      Method::InjectTcp => "inject-tcp",
      Method::VpnTcp => "vpn-tcp",
    }
  }

  /// Methods that hold an exclusive resource and cannot share the cluster
  /// with concurrent test workers.
  pub fn requires_serial(self) -> bool {
    matches!(self, Method::VpnTcp | Method::Container)
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Parser)]
#[command(version, about = "Build, push and test Telepresence")]
pub struct Cli {
  /// Use the fixed CircleCI preset; overrides most other options.
  #[arg(long)]
  pub circle: bool,

  /// Docker registry to push images to (e.g. `datawire`).
  #[arg(long)]
  pub registry: Option<String>,

  /// Build the Docker images and push them to the registry.
  #[arg(long)]
  pub build_and_push: bool,

  /// Suffix appended to the git tag. `{OS}` and `{TIME}` are substituted.
  #[arg(long, default_value = DEFAULT_VERSION_SUFFIX, allow_hyphen_values = true)]
  pub version_suffix: String,

  /// Recreate the virtualenv and install all dependencies into it.
  #[arg(long)]
  pub manage_virtualenv: bool,

  /// Skip running the test suite.
  #[arg(long = "no-tests", action = clap::ArgAction::SetFalse)]
  pub run_tests: bool,

  /// Run the linters before building.
  #[arg(long)]
  pub lint: bool,

  /// Run the per-method end-to-end tests with this method. Repeatable.
  #[arg(long = "method", value_enum)]
  pub methods: Vec<Method>,

  /// Optional settings file.
  #[arg(long, default_value = "tp-ci.toml")]
  pub config: PathBuf,

  /// Print commands instead of executing them.
  #[arg(long)]
  pub dry_run: bool,

  /// Print the resolved run configuration as JSON and exit.
  #[arg(long)]
  pub print_config: bool,

  /// All remaining arguments are passed to py.test.
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub test_args: Vec<String>,
}
