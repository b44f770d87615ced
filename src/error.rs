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
use thiserror::Error;

/// Top-level error enum for the telepresence-ci library.
#[derive(Error, Debug)]
pub enum CiError {
  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("Failed to load settings")]
  Settings(#[from] Box<figment::Error>),

  #[error(transparent)]
  Command(#[from] CommandError),

  #[error("Failed to resolve version")]
  Version(#[from] VersionError),

  #[error("I/O error")]
  Io(#[from] std::io::Error),

  #[error("JSON serialization error")]
  Json(#[from] serde_json::Error),
}

impl CiError {
  /// The status the whole program should exit with for this error.
  ///
  /// A failed child process hands its own exit code through; everything
  /// else is a plain failure.
  pub fn exit_code(&self) -> i32 {
    match self {
      CiError::Command(e) => e.exit_code(),
      _ => 1,
    }
  }
}

/// Errors raised while resolving the run configuration and checking
/// preconditions (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("CI mode requires the environment variable {name} to be set")]
  MissingCiVariable { name: &'static str },

  #[error("Required executable '{name}' was not found on PATH")]
  MissingExecutable { name: &'static str },

  #[error("No registry configured. Pass --registry <REGISTRY> (e.g. --registry datawire)")]
  MissingRegistry,
}

/// Errors from running external commands (src/process.rs).
#[derive(Error, Debug)]
pub enum CommandError {
  #[error("Failed to execute `{command}`")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Command `{command}` exited with status {code}")]
  Failed { command: String, code: i32 },

  #[error("Command `{command}` was terminated by a signal")]
  Terminated { command: String },

  #[error("Command `{command}` produced non UTF-8 output")]
  NonUtf8Output {
    command: String,
    #[source]
    source: std::string::FromUtf8Error,
  },

  #[error("Failed to remove {path}")]
  RemoveDir {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl CommandError {
  pub fn exit_code(&self) -> i32 {
    match self {
      CommandError::Failed { code, .. } => *code,
      _ => 1,
    }
  }
}

/// Errors related to version string resolution (src/version.rs).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
  #[error("`git describe` returned an empty tag")]
  EmptyTag,

  #[error("Unknown placeholder '{{{name}}}' in version suffix '{template}'")]
  UnknownPlaceholder { name: String, template: String },

  #[error("Unbalanced brace in version suffix '{template}'")]
  UnbalancedBrace { template: String },
}
