//! Custom resource schemas
//!
//! Typed specs for the platform's custom resources, all under the
//! `jenkins.io/v1` API group. The cluster owns their lifecycle; jx
//! reads and writes them through the dynamic API, so each spec knows
//! its kind and plural for [`ApiResource`] construction.

use chrono::{DateTime, Utc};
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// API group of the platform's custom resources
pub const GROUP: &str = "jenkins.io";
/// API version of the platform's custom resources
pub const VERSION: &str = "v1";

/// A spec type backing one custom resource kind
pub trait JxResource: Serialize + DeserializeOwned {
    /// Kind name, e.g. `Environment`
    const KIND: &'static str;
    /// Plural used in API paths, e.g. `environments`
    const PLURAL: &'static str;

    /// Returns the [`ApiResource`] addressing this kind
    #[must_use]
    fn api_resource() -> ApiResource {
        ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(GROUP, VERSION, Self::KIND),
            Self::PLURAL,
        )
    }
}

/// Builds a namespaced [`DynamicObject`] carrying the given spec
///
/// # Errors
///
/// Returns an error when the spec fails to serialize.
pub fn to_object<S: JxResource>(
    name: &str,
    namespace: &str,
    spec: &S,
) -> Result<DynamicObject, serde_json::Error> {
    let mut obj = DynamicObject::new(name, &S::api_resource()).within(namespace);
    obj.data = serde_json::json!({ "spec": serde_json::to_value(spec)? });
    Ok(obj)
}

/// Decodes the typed spec out of a [`DynamicObject`]
///
/// # Errors
///
/// Returns an error when the object has no `spec` or it does not match
/// the schema.
pub fn spec_of<S: JxResource>(obj: &DynamicObject) -> Result<S, serde_json::Error> {
    let spec = obj
        .data
        .get("spec")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    serde_json::from_value(spec)
}

/// How releases move into an environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionStrategy {
    /// The environment never receives promotions
    Never,
    /// Releases are promoted automatically after a successful pipeline
    Auto,
    /// Promotion happens through a reviewed pull request
    #[default]
    Manual,
}

/// Git source backing an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSource {
    /// Clone URL of the environment repository
    pub url: String,
    /// Branch holding the environment definition
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
}

fn default_ref() -> String {
    "master".to_string()
}

/// Spec of the Environment custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSpec {
    /// Human-readable label shown in tables
    pub label: String,
    /// Namespace the environment's workloads deploy into
    pub namespace: String,
    /// Position in the promotion order, ascending
    #[serde(default)]
    pub order: i32,
    /// How releases reach this environment
    #[serde(default)]
    pub promotion_strategy: PromotionStrategy,
    /// Environment repository, when GitOps-managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EnvironmentSource>,
}

impl JxResource for EnvironmentSpec {
    const KIND: &'static str = "Environment";
    const PLURAL: &'static str = "environments";
}

/// Spec of the Team custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSpec {
    /// Human-readable team label
    pub label: String,
    /// Login names of the team members
    #[serde(default)]
    pub members: Vec<String>,
}

impl JxResource for TeamSpec {
    const KIND: &'static str = "Team";
    const PLURAL: &'static str = "teams";
}

/// Outcome states of a pipeline run or step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    /// Queued but not started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Cancelled before completion
    Aborted,
}

impl ActivityStatus {
    /// Returns true once the run can no longer change state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Aborted)
    }
}

/// One recorded step of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineActivityStep {
    /// Step name
    pub name: String,
    /// Step outcome
    pub status: ActivityStatus,
    /// Free-text detail, e.g. the promoted environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Spec of the PipelineActivity custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineActivitySpec {
    /// Pipeline name, `owner/repo/branch` form
    pub pipeline: String,
    /// Build number within the pipeline
    pub build: u32,
    /// Current run state
    pub status: ActivityStatus,
    /// When the run started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_timestamp: Option<DateTime<Utc>>,
    /// When the run reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<DateTime<Utc>>,
    /// Recorded steps, in execution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PipelineActivityStep>,
    /// Repository the pipeline builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    /// Version produced by the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl JxResource for PipelineActivitySpec {
    const KIND: &'static str = "PipelineActivity";
    const PLURAL: &'static str = "pipelineactivities";
}

/// Spec of the Release custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    /// Application name
    pub name: String,
    /// Released version
    pub version: String,
    /// Git tag the release was cut from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_tag: Option<String>,
    /// Repository the release came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
}

impl JxResource for ReleaseSpec {
    const KIND: &'static str = "Release";
    const PLURAL: &'static str = "releases";
}

/// Spec of the GitService custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitServiceSpec {
    /// Base URL of the git server
    pub url: String,
    /// Provider kind of the server
    pub git_kind: String,
}

impl JxResource for GitServiceSpec {
    const KIND: &'static str = "GitService";
    const PLURAL: &'static str = "gitservices";
}

/// One environment step of a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Environment promoted to in this step
    pub environment: String,
}

/// Spec of the Workflow custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    /// Promotion steps, in order
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

impl JxResource for WorkflowSpec {
    const KIND: &'static str = "Workflow";
    const PLURAL: &'static str = "workflows";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn environment() -> EnvironmentSpec {
        EnvironmentSpec {
            label: "Staging".to_string(),
            namespace: "jx-staging".to_string(),
            order: 100,
            promotion_strategy: PromotionStrategy::Auto,
            source: Some(EnvironmentSource {
                url: "https://github.com/jx-org/environment-staging.git".to_string(),
                git_ref: "master".to_string(),
            }),
        }
    }

    #[test]
    fn test_api_resource_coordinates() {
        let ar = EnvironmentSpec::api_resource();
        assert_eq!(ar.group, "jenkins.io");
        assert_eq!(ar.version, "v1");
        assert_eq!(ar.kind, "Environment");
        assert_eq!(ar.plural, "environments");
        assert_eq!(ar.api_version, "jenkins.io/v1");
    }

    #[test]
    fn test_object_round_trip() {
        let spec = environment();
        let obj = to_object("staging", "jx", &spec).unwrap();
        assert_eq!(obj.metadata.name.as_deref(), Some("staging"));
        assert_eq!(obj.metadata.namespace.as_deref(), Some("jx"));
        assert_eq!(
            obj.types.as_ref().map(|t| t.kind.as_str()),
            Some("Environment")
        );

        let decoded: EnvironmentSpec = spec_of(&obj).unwrap();
        assert_eq!(decoded, spec);
    }

    #[test]
    fn test_spec_serialization_shape() {
        let value = serde_json::to_value(environment()).unwrap();
        assert_eq!(value["promotionStrategy"], "Auto");
        assert_eq!(value["source"]["ref"], "master");
        assert_eq!(value["order"], 100);
    }

    #[test]
    fn test_spec_defaults_on_decode() {
        let spec: EnvironmentSpec =
            serde_json::from_value(serde_json::json!({
                "label": "Dev",
                "namespace": "jx-dev"
            }))
            .unwrap();
        assert_eq!(spec.order, 0);
        assert_eq!(spec.promotion_strategy, PromotionStrategy::Manual);
        assert_eq!(spec.source, None);
    }

    #[test]
    fn test_missing_spec_fails_decode() {
        let obj = DynamicObject::new("x", &EnvironmentSpec::api_resource());
        assert!(spec_of::<EnvironmentSpec>(&obj).is_err());
    }

    #[test]
    fn test_activity_status_terminal() {
        assert!(ActivityStatus::Succeeded.is_terminal());
        assert!(ActivityStatus::Aborted.is_terminal());
        assert!(!ActivityStatus::Running.is_terminal());
        assert!(!ActivityStatus::Pending.is_terminal());
    }

    #[test]
    fn test_team_and_workflow_round_trip() {
        let team = TeamSpec {
            label: "Platform".to_string(),
            members: vec!["alice".to_string(), "bob".to_string()],
        };
        let value = serde_json::to_value(&team).unwrap();
        assert_eq!(value["members"][1], "bob");
        assert_eq!(serde_json::from_value::<TeamSpec>(value).unwrap(), team);

        let workflow = WorkflowSpec {
            steps: vec![
                WorkflowStep {
                    environment: "staging".to_string(),
                },
                WorkflowStep {
                    environment: "production".to_string(),
                },
            ],
        };
        let value = serde_json::to_value(&workflow).unwrap();
        assert_eq!(value["steps"][0]["environment"], "staging");
        assert_eq!(
            serde_json::from_value::<WorkflowSpec>(value).unwrap(),
            workflow
        );
        assert_eq!(WorkflowSpec::PLURAL, "workflows");
        assert_eq!(TeamSpec::KIND, "Team");
    }

    #[test]
    fn test_activity_timestamps_serialize_rfc3339() {
        let spec = PipelineActivitySpec {
            pipeline: "jx-org/jx/master".to_string(),
            build: 4,
            status: ActivityStatus::Running,
            started_timestamp: Some("2020-01-02T03:04:05Z".parse().unwrap()),
            completed_timestamp: None,
            steps: vec![],
            git_url: None,
            version: None,
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["startedTimestamp"], "2020-01-02T03:04:05Z");
        assert!(value.get("completedTimestamp").is_none());
        assert!(value.get("steps").is_none());
    }
}
