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
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Prefix for environment variables that override settings,
/// e.g. `TP_CI_MAX_PROCESSES=2`.
pub const ENV_PREFIX: &str = "TP_CI_";

/// Tunables that rarely change between runs.
///
/// Layered as: built-in defaults, then the optional TOML file, then
/// `TP_CI_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
  /// Directory of the managed virtualenv; its `bin/` is prepended to `PATH`.
  pub virtualenv_dir: PathBuf,

  /// Interpreter the virtualenv is created with.
  pub python: String,

  /// Upper bound for `--numprocesses`.
  pub max_processes: u32,

  /// Per-test timeout passed to py.test.
  pub test_timeout_secs: u64,

  /// Service account key used in CI mode.
  pub credentials_file: PathBuf,

  /// Registry host the CI project lives under.
  pub gcr_host: String,
}

impl Default for Settings {
  fn default() -> Self {
    Settings {
      virtualenv_dir: PathBuf::from("virtualenv"),
      python: "python3".to_string(),
      max_processes: 4,
      test_timeout_secs: 360,
      credentials_file: PathBuf::from("gcloud-service-key.json"),
      gcr_host: "gcr.io".to_string(),
    }
  }
}

impl Settings {
  pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(Settings::default()))
      .merge(Toml::file(config_file))
      .merge(Env::prefixed(ENV_PREFIX).only(&[
        "virtualenv_dir",
        "python",
        "max_processes",
        "test_timeout_secs",
        "credentials_file",
        "gcr_host",
      ]))
  }

  /// Loads settings; a missing file is not an error.
  pub fn load(config_file: &Path) -> Result<Self, Box<figment::Error>> {
    Settings::figment(config_file).extract().map_err(Box::new)
  }

  /// Directory holding the virtualenv's executables.
  pub fn virtualenv_bin(&self) -> PathBuf {
    self.virtualenv_dir.join("bin")
  }
}
