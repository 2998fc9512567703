//! Kubernetes layer
//!
//! Client construction and the platform's custom resources. All object
//! lifecycle and consistency is delegated to the API server; this
//! module only builds, applies and reads objects.

pub mod activities;
pub mod api;
pub mod environments;
pub mod names;
pub mod resources;

use thiserror::Error;

pub use activities::{Activities, activity_name};
pub use api::{ResourceClient, create_client};
pub use environments::{Environments, default_environments};
pub use names::{to_valid_name, to_valid_value};
pub use resources::{
    ActivityStatus, EnvironmentSource, EnvironmentSpec, GitServiceSpec, JxResource,
    PipelineActivitySpec, PipelineActivityStep, PromotionStrategy, ReleaseSpec, TeamSpec,
    WorkflowSpec, WorkflowStep,
};

/// Errors from the Kubernetes layer
#[derive(Error, Debug)]
pub enum KubeError {
    /// Kubeconfig file could not be loaded
    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// The API server call failed
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// A resource payload could not be encoded or decoded
    #[error("Invalid resource payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested object does not exist
    #[error("{0} not found")]
    NotFound(String),
}
