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
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

/// Set by the macOS Python launcher; leaks into child interpreters and makes
/// virtualenv pick the wrong `sys.executable`.
pub const PYVENV_LAUNCHER: &str = "__PYVENV_LAUNCHER__";

/// The operating system the orchestrator runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
  Linux,
  Darwin,
  Other(String),
}

impl Platform {
  pub fn current() -> Self {
    Platform::from_os(env::consts::OS)
  }

  /// Maps a Rust/Python style OS name onto a platform. `macos` and `darwin`
  /// are the same thing.
  pub fn from_os(os: &str) -> Self {
    match os {
      "linux" => Platform::Linux,
      "darwin" | "macos" => Platform::Darwin,
      other => Platform::Other(other.to_string()),
    }
  }

  /// Short code embedded in version strings, if this platform has one.
  pub fn os_code(&self) -> Option<&'static str> {
    match self {
      Platform::Linux => Some("LNX"),
      Platform::Darwin => Some("OSX"),
      Platform::Other(_) => None,
    }
  }

  pub fn is_linux(&self) -> bool {
    *self == Platform::Linux
  }
}

/// Environment variables exactly as the OS reports them, including names or
/// values that are not valid UTF-8.
pub type EnvVars = BTreeMap<OsString, OsString>;

/// Immutable snapshot of the environment the orchestrator was started in.
///
/// The snapshot is the only view of the environment the rest of the crate
/// gets. Child processes receive it (plus their own overlay) instead of the
/// live process environment, so nothing here ever mutates global state.
#[derive(Debug, Clone)]
pub struct Host {
  platform: Platform,
  vars: EnvVars,
  cwd: PathBuf,
}

impl Host {
  /// Captures the current process environment, dropping
  /// `__PYVENV_LAUNCHER__` if it is present. Every other variable is kept
  /// byte for byte.
  pub fn from_process() -> std::io::Result<Self> {
    Ok(Host::new(Platform::current(), env::vars_os().collect(), env::current_dir()?))
  }

  pub fn new(platform: Platform, mut vars: EnvVars, cwd: PathBuf) -> Self {
    if vars.remove(OsStr::new(PYVENV_LAUNCHER)).is_some() {
      tracing::debug!("Removed {} from the child environment", PYVENV_LAUNCHER);
    }
    Host {
      platform,
      vars,
      cwd,
    }
  }

  pub fn platform(&self) -> &Platform {
    &self.platform
  }

  /// A variable's value, if it is set and valid UTF-8.
  pub fn var(&self, name: &str) -> Option<&str> {
    self.var_os(name)?.to_str()
  }

  pub fn var_os(&self, name: &str) -> Option<&OsStr> {
    self.vars.get(OsStr::new(name)).map(OsString::as_os_str)
  }

  pub fn vars(&self) -> &EnvVars {
    &self.vars
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  /// Resolves `path` against the working directory the host was captured in.
  pub fn absolute(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.cwd.join(path)
    }
  }

  /// Looks `name` up on the snapshot's `PATH`, like `which`.
  pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
    let path = self.var_os("PATH")?;
    env::split_paths(path)
      .filter(|dir| !dir.as_os_str().is_empty())
      .map(|dir| self.absolute(&dir).join(name))
      .find(|candidate| is_executable(candidate))
  }

  /// Returns a copy of the snapshot whose `PATH` starts with `dir`.
  pub fn with_path_prefix(&self, dir: &Path) -> EnvVars {
    let mut vars = self.vars.clone();
    let prefixed = match self.var_os("PATH") {
      Some(existing) if !existing.is_empty() => {
        let dirs = std::iter::once(dir.to_path_buf()).chain(env::split_paths(existing));
        match env::join_paths(dirs) {
          Ok(joined) => joined,
          Err(e) => {
            tracing::warn!(error = %e, "Cannot prefix PATH, leaving it unchanged");
            existing.to_os_string()
          }
        }
      }
      _ => dir.as_os_str().to_os_string(),
    };
    vars.insert(OsString::from("PATH"), prefixed);
    vars
  }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;
  path
    .metadata()
    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
  path.is_file() || path.with_extension("exe").is_file()
}
