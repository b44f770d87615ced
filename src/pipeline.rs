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
use crate::config::RunConfig;
use crate::config::check_preconditions;
use crate::error::CiError;
use crate::host::Host;
use crate::images;
use crate::process::Executor;
use crate::process::check_call;
use crate::settings::Settings;
use crate::suite;
use crate::toolchain;
use crate::version::resolve_version;
use tracing::Instrument;

/// Everything a run needs besides the executor.
#[derive(Debug)]
pub struct Pipeline<'a> {
  pub config: &'a RunConfig,
  pub settings: &'a Settings,
  pub host: &'a Host,
}

impl Pipeline<'_> {
  /// Runs every enabled stage in order. Each stage starts only after the
  /// previous one's commands have all exited successfully.
  pub async fn run<E: Executor + ?Sized>(&self, exec: &mut E) -> Result<(), CiError> {
    let span = tracing::info_span!(
      "pipeline",
      registry = self.config.registry.as_deref().unwrap_or("none"),
      methods = ?self.config.methods
    );
    self.run_stages(exec).instrument(span).await
  }

  /// `sudo true` is issued only when the run will touch a cluster (tests or
  /// `--method`). Lint, build and version-only runs never prompt for a
  /// password.
  async fn run_stages<E: Executor + ?Sized>(&self, exec: &mut E) -> Result<(), CiError> {
    let Pipeline {
      config,
      settings,
      host,
    } = *self;

    tracing::info!("--- Starting CI Pipeline ---");
    let registry = check_preconditions(config, host)?;

    if config.wants_cluster() {
      tracing::info!("Caching sudo credentials before the long-running steps");
      check_call(exec, &suite::sudo_refresh_command()).await?;
    }

    if config.manage_virtualenv {
      toolchain::setup_virtualenv(exec, settings, host)
        .instrument(tracing::info_span!("virtualenv"))
        .await?;
    }

    if config.lint {
      toolchain::run_linters(exec)
        .instrument(tracing::info_span!("lint"))
        .await?;
    }

    let version = resolve_version(exec, &config.version_suffix, host.platform()).await?;

    if config.build_and_push {
      images::build_and_push(exec, registry, &version)
        .instrument(tracing::info_span!("images", %version))
        .await?;
    }

    if config.run_tests {
      suite::run_tests(exec, config, settings, host, &version).await?;
    }

    tracing::info!("--- CI pipeline complete ---");
    Ok(())
  }
}
