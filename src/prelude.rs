//! Prelude module for common imports

// Re-export git provider types with full paths
pub use crate::git::auth::{AuthConfig, AuthServer, UserAuth};
pub use crate::git::errors::GitError;
pub use crate::git::provider::GitProvider;
pub use crate::git::types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};
pub use crate::git::url::GitRepoInfo;

// Re-export kubernetes resource types
pub use crate::kube::resources::{
    ActivityStatus, EnvironmentSpec, GitServiceSpec, PipelineActivitySpec, PipelineActivityStep,
    PromotionStrategy, ReleaseSpec, TeamSpec, WorkflowSpec,
};

// Re-export service clients
pub use crate::helm::{HelmClient, HelmError, HelmRelease};
pub use crate::infrastructure::{Config, generate_secret, init_logging};
pub use crate::process::{CommandOutput, CommandRunner, ProcessError};
