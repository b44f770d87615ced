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
use crate::error::CiError;
use crate::error::VersionError;
use crate::host::Platform;
use crate::process::Executor;
use crate::process::check_output;

/// `git describe --tags`, the source of the base version.
pub fn describe_command() -> CommandSpec {
  CommandSpec::new("git").args(["describe", "--tags"])
}

/// Asks git for the nearest tag and appends the formatted suffix.
pub async fn resolve_version<E: Executor + ?Sized>(
  exec: &mut E,
  suffix_template: &str,
  platform: &Platform,
) -> Result<String, CiError> {
  let raw = check_output(exec, &describe_command()).await?;
  let timestamp = chrono::Utc::now().timestamp();
  let version = compose_version(&raw, suffix_template, platform, timestamp)?;
  tracing::info!(%version, "Resolved version");
  Ok(version)
}

/// Builds `<tag><suffix>` from the raw output of `git describe`.
pub fn compose_version(
  describe_output: &str,
  suffix_template: &str,
  platform: &Platform,
  timestamp: i64,
) -> Result<String, VersionError> {
  let tag = describe_output.trim();
  if tag.is_empty() {
    return Err(VersionError::EmptyTag);
  }
  let suffix = format_suffix(suffix_template, platform.os_code(), timestamp)?;
  Ok(format!("{tag}{suffix}"))
}

/// Substitutes `{OS}` and `{TIME}` in `template`.
///
/// `{{` and `}}` produce literal braces. `os` is `None` on a platform
/// without an OS code (anything but Linux and macOS); `{OS}` then renders as
/// the empty string rather than failing, so `-{OS}-{TIME}` becomes `--<time>`.
pub fn format_suffix(template: &str, os: Option<&str>, timestamp: i64) -> Result<String, VersionError> {
  let unbalanced = || VersionError::UnbalancedBrace {
    template: template.to_string(),
  };

  let mut out = String::with_capacity(template.len() + 16);
  let mut chars = template.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '{' if chars.peek() == Some(&'{') => {
        chars.next();
        out.push('{');
      }
      '}' if chars.peek() == Some(&'}') => {
        chars.next();
        out.push('}');
      }
      '{' => {
        let mut name = String::new();
        loop {
          match chars.next() {
            Some('}') => break,
            Some('{') | None => return Err(unbalanced()),
            Some(ch) => name.push(ch),
          }
        }
        match name.as_str() {
          "OS" => out.push_str(os.unwrap_or_default()),
          "TIME" => out.push_str(&timestamp.to_string()),
          _ => {
            return Err(VersionError::UnknownPlaceholder {
              name,
              template: template.to_string(),
            });
          }
        }
      }
      '}' => return Err(unbalanced()),
      other => out.push(other),
    }
  }
  Ok(out)
}
