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
use std::fmt;

/// One external invocation: program, arguments and an environment overlay.
///
/// The overlay is merged onto the host snapshot only when the command is
/// executed; building a `CommandSpec` never touches the real environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  /// The command to execute (e.g., "docker" or "/path/to/binary").
  pub program: String,

  pub args: Vec<String>,

  /// Extra environment variables for this invocation only.
  pub env: BTreeMap<String, String>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>) -> Self {
    CommandSpec {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
    self
      .env
      .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  /// Shell-style rendering, overlay assignments first, suitable for
  /// copy-pasting into a terminal.
  pub fn command_line(&self) -> String {
    let assignments = self
      .env
      .iter()
      .map(|(k, v)| format!("{}={}", k, shell_quote(v)));
    let argv = std::iter::once(shell_quote(&self.program)).chain(self.args.iter().map(|a| shell_quote(a)));
    assignments.chain(argv).collect::<Vec<_>>().join(" ")
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.command_line())
  }
}

fn shell_quote(arg: &str) -> String {
  if arg.is_empty() {
    return "''".to_string();
  }
  let safe = arg.chars().all(|ch| {
    matches!(
      ch,
      'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | ':' | '@' | '+' | '=' | ','
    )
  });
  if safe {
    return arg.to_string();
  }
  let escaped = arg.replace('\'', "'\"'\"'");
  format!("'{escaped}'")
}
