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
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use telepresence_ci::cli::Cli;
use telepresence_ci::config;
use telepresence_ci::error::CiError;
use telepresence_ci::host::Host;
use telepresence_ci::logging::setup_tracing;
use telepresence_ci::pipeline::Pipeline;
use telepresence_ci::process::DryRunExecutor;
use telepresence_ci::process::SystemExecutor;
use telepresence_ci::settings::Settings;
use tracing::Instrument;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  let _guard = match setup_tracing() {
    Ok(guard) => guard,
    Err(e) => {
      eprintln!("Error: failed to set up logging: {e:#}");
      return ExitCode::FAILURE;
    }
  };

  match run(cli).instrument(tracing::info_span!("tp-ci")).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      let code = e.downcast_ref::<CiError>().map_or(1, CiError::exit_code);
      eprintln!("Error: {e:#}");
      ExitCode::from(u8::try_from(code).unwrap_or(1))
    }
  }
}

async fn run(cli: Cli) -> Result<()> {
  let host = Host::from_process().map_err(CiError::from)?;
  let settings = Settings::load(&cli.config).map_err(CiError::from)?;
  tracing::debug!(?settings, "Loaded settings");

  let dry_run = cli.dry_run;
  let print_config = cli.print_config;
  let config = config::resolve(cli, &host, &settings).map_err(CiError::from)?;

  if print_config {
    let json = serde_json::to_string_pretty(&config).map_err(CiError::from)?;
    println!("{json}");
    return Ok(());
  }

  let tool_bin = host.absolute(&settings.virtualenv_bin());
  let mut system = SystemExecutor::new(host.with_path_prefix(&tool_bin));
  let pipeline = Pipeline {
    config: &config,
    settings: &settings,
    host: &host,
  };

  if dry_run {
    tracing::info!("Dry run: commands are printed, not executed");
    pipeline.run(&mut DryRunExecutor::new(system)).await?;
  } else {
    pipeline.run(&mut system).await?;
  }
  Ok(())
}
