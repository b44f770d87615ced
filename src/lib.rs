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

//! # telepresence-ci
//!
//! `telepresence-ci` drives a Telepresence build from a developer machine or
//! CI: it prepares the Python tooling, lints, builds and pushes the Docker
//! images, and runs the end-to-end suite once per proxying method.
//!
//! Every external effect goes through one [`process::Executor`], so the whole
//! pipeline can be exercised without Docker, git or a cluster.
//!
//! ## Core Modules
//!
//! * [`cli`]: Defines the `clap`-based command-line interface and [`cli::Method`].
//! * [`config`]: Turns the CLI into a `RunConfig`, either from explicit flags or
//!   from the CI preset, and checks preconditions.
//! * [`host`]: Immutable snapshot of the environment the run started in.
//! * [`settings`]: File and environment overridable tunables, via `figment`.
//! * [`toolchain`]: Virtualenv provisioning and the linters.
//! * [`version`]: Derives the version from `git describe` and a suffix template.
//! * [`images`]: Builds and pushes the two Docker images.
//! * [`suite`]: Parallelism, test environment and the py.test invocations.
//! * [`pipeline`]: Runs the stages in order.
//! * [`process`]: The `Executor` trait and its real and dry-run implementations.
//! * [`command`]: Defines the shared `CommandSpec` struct.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod images;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod settings;
pub mod suite;
pub mod toolchain;
pub mod version;
