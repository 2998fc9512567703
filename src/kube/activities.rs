//! PipelineActivity resource helpers
//!
//! Records pipeline runs in the cluster. Build numbers are allocated by
//! reading the existing activities for a pipeline at submit time; the
//! API server remains the source of truth.

use chrono::Utc;
use kube::Client;

use super::KubeError;
use super::api::ResourceClient;
use super::names::to_valid_name;
use super::resources::{ActivityStatus, PipelineActivitySpec, PipelineActivityStep};

/// PipelineActivity CRUD scoped to the team namespace
pub struct Activities {
    client: ResourceClient<PipelineActivitySpec>,
}

impl Activities {
    /// Creates a helper scoped to the team namespace
    #[must_use]
    pub fn new(client: Client, team_namespace: &str) -> Self {
        Self {
            client: ResourceClient::new(client, team_namespace),
        }
    }

    /// Lists activities, newest build first
    ///
    /// The filter, when given, matches as a substring of the pipeline
    /// name.
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn list(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<(String, PipelineActivitySpec)>, KubeError> {
        let mut activities = self.client.list().await?;
        if let Some(filter) = filter {
            activities.retain(|(_, a)| a.pipeline.contains(filter));
        }
        activities.sort_by(|(_, a), (_, b)| {
            b.started_timestamp
                .cmp(&a.started_timestamp)
                .then_with(|| b.build.cmp(&a.build))
        });
        Ok(activities)
    }

    /// Allocates the next build number for a pipeline
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn next_build(&self, pipeline: &str) -> Result<u32, KubeError> {
        let activities = self.client.list().await?;
        let max = activities
            .iter()
            .filter(|(_, a)| a.pipeline == pipeline)
            .map(|(_, a)| a.build)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    /// Records a new running activity and returns its name and build
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn start(&self, pipeline: &str) -> Result<(String, u32), KubeError> {
        let build = self.next_build(pipeline).await?;
        let spec = PipelineActivitySpec {
            pipeline: pipeline.to_string(),
            build,
            status: ActivityStatus::Running,
            started_timestamp: Some(Utc::now()),
            completed_timestamp: None,
            steps: Vec::new(),
            git_url: None,
            version: None,
        };
        let name = activity_name(pipeline, build);
        self.client.apply(&name, &spec).await?;
        Ok((name, build))
    }

    /// Records a pending activity for a newly imported pipeline
    ///
    /// # Errors
    ///
    /// Returns an error when the API call fails.
    pub async fn register(&self, pipeline: &str) -> Result<(String, u32), KubeError> {
        let build = self.next_build(pipeline).await?;
        let spec = PipelineActivitySpec {
            pipeline: pipeline.to_string(),
            build,
            status: ActivityStatus::Pending,
            started_timestamp: None,
            completed_timestamp: None,
            steps: Vec::new(),
            git_url: None,
            version: None,
        };
        let name = activity_name(pipeline, build);
        self.client.apply(&name, &spec).await?;
        Ok((name, build))
    }

    /// Appends a step to an activity and updates its status
    ///
    /// Terminal statuses also stamp the completion time.
    ///
    /// # Errors
    ///
    /// Returns [`KubeError::NotFound`] when the activity does not exist.
    pub async fn record_step(
        &self,
        name: &str,
        step: PipelineActivityStep,
        status: ActivityStatus,
    ) -> Result<(), KubeError> {
        let mut spec = self.client.get(name).await?;
        spec.steps.push(step);
        spec.status = status;
        if status.is_terminal() {
            spec.completed_timestamp = Some(Utc::now());
        }
        self.client.apply(name, &spec).await
    }
}

/// Activity object name for a pipeline and build number
#[must_use]
pub fn activity_name(pipeline: &str, build: u32) -> String {
    to_valid_name(&format!("{pipeline}-{build}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_activity_name() {
        assert_eq!(activity_name("jx-org/jx/master", 4), "jx-org-jx-master-4");
        assert_eq!(activity_name("My App", 12), "my-app-12");
    }
}
