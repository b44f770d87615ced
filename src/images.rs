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
use crate::error::CommandError;
use crate::process::Executor;
use crate::process::check_call;

/// A Docker image built from this repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
  pub name: &'static str,
  /// Build context, relative to the repository root.
  pub context: &'static str,
}

/// Image run on the developer machine by the `container` method.
pub const LOCAL_IMAGE: Image = Image {
  name: "telepresence-local",
  context: ".",
};

/// Proxy image deployed into the cluster.
pub const K8S_IMAGE: Image = Image {
  name: "telepresence-k8s",
  context: "k8s-proxy",
};

pub const IMAGES: [Image; 2] = [LOCAL_IMAGE, K8S_IMAGE];

impl Image {
  pub fn tag(&self, registry: &str, version: &str) -> String {
    format!("{}/{}:{}", registry, self.name, version)
  }

  pub fn build_command(&self, registry: &str, version: &str) -> CommandSpec {
    CommandSpec::new("docker").args(["build", self.context, "-t", self.tag(registry, version).as_str()])
  }

  pub fn push_command(&self, registry: &str, version: &str) -> CommandSpec {
    CommandSpec::new("docker").args(["push", self.tag(registry, version).as_str()])
  }
}

/// Builds both images, then pushes both.
///
/// A failed push leaves earlier pushes in place.
pub async fn build_and_push<E: Executor + ?Sized>(
  exec: &mut E,
  registry: &str,
  version: &str,
) -> Result<(), CommandError> {
  for image in IMAGES {
    tracing::info!(image = image.name, "Building image");
    check_call(exec, &image.build_command(registry, version)).await?;
  }
  for image in IMAGES {
    tracing::info!(tag = %image.tag(registry, version), "Pushing image");
    check_call(exec, &image.push_command(registry, version)).await?;
  }
  Ok(())
}
