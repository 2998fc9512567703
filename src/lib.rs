//! # jx - Continuous Delivery for Kubernetes
//!
//! jx is a command-line tool that orchestrates a continuous-delivery
//! platform on top of Kubernetes: environments and releases tracked as
//! custom resources, promotion between environments, Helm chart
//! operations, and repository workflows against the major git hosting
//! providers.
//!
//! ## Quick Start
//!
//! ```bash
//! # Bootstrap the platform into the current cluster
//! jx install
//!
//! # List environments, ordered by promotion order
//! jx get environments
//!
//! # Promote an application version into staging
//! jx promote --app my-app --version 1.2.3 --env staging
//!
//! # Fork and clone a repository, wiring the upstream remote
//! jx fork https://github.com/jx-org/jx
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into thin service layers, each consumed by the
//! command handlers in [`cli`]:
//!
//! - [`git`]: a provider abstraction over GitHub, GitLab, BitBucket and
//!   Gitea REST APIs, plus auth configuration and URL handling
//! - [`kube`]: custom resource schemas and dynamic-API plumbing for the
//!   platform's Environment, PipelineActivity and Release objects
//! - [`helm`]: a wrapper around the `helm` binary
//! - [`process`]: captured-output command execution
//! - [`infrastructure`]: configuration, logging and secret generation
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod git;
pub mod helm;
pub mod infrastructure;
pub mod kube;
pub mod process;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use git::{
    AuthConfig, AuthServer, CreatePullRequest, CreateRepository, GitError, GitKind, GitProvider,
    GitRepoInfo, GitRepository, GitUser, PullRequest, UserAuth,
};
pub use helm::{HelmClient, HelmError, HelmRelease};
pub use infrastructure::{Config, generate_secret, init_logging};
pub use self::kube::{
    ActivityStatus, EnvironmentSpec, PipelineActivitySpec, PromotionStrategy, ReleaseSpec,
};
pub use process::{CommandOutput, CommandRunner, ProcessError};

/// Version of the jx crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
