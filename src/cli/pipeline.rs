//! `jx get activities` / `jx start pipeline` - Pipeline activity
//!
//! Pipeline runs are PipelineActivity custom resources; these handlers
//! list them and record new runs.

use std::path::Path;

use anyhow::{Context, Result};

use crate::kube::{Activities, create_client};

/// Prints the activities table, newest first
///
/// # Errors
///
/// Returns an error when the cluster is unreachable.
pub async fn get_activities(
    kubeconfig: Option<&Path>,
    team_namespace: &str,
    filter: Option<&str>,
) -> Result<()> {
    let client = create_client(kubeconfig)
        .await
        .context("Failed to connect to the cluster")?;
    let activities = Activities::new(client, team_namespace);
    let entries = activities
        .list(filter)
        .await
        .context("Failed to list pipeline activities")?;

    if entries.is_empty() {
        println!("No pipeline activities found in namespace {team_namespace}");
        return Ok(());
    }

    println!(
        "{:<40} {:>6} {:<10} {}",
        "PIPELINE", "BUILD", "STATUS", "STARTED"
    );
    for (_, activity) in entries {
        let started = activity
            .started_timestamp
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:>6} {:<10} {}",
            activity.pipeline,
            activity.build,
            format!("{:?}", activity.status),
            started
        );
    }
    Ok(())
}

/// Records a new running activity for a pipeline
///
/// # Errors
///
/// Returns an error when the cluster is unreachable or the write fails.
pub async fn start_pipeline(
    kubeconfig: Option<&Path>,
    team_namespace: &str,
    pipeline: &str,
) -> Result<()> {
    let client = create_client(kubeconfig)
        .await
        .context("Failed to connect to the cluster")?;
    let activities = Activities::new(client, team_namespace);
    let (name, build) = activities
        .start(pipeline)
        .await
        .with_context(|| format!("Failed to start pipeline '{pipeline}'"))?;
    println!("Started pipeline {pipeline} build #{build} (activity {name})");
    Ok(())
}
