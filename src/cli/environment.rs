//! `jx create/get/delete environment` - Environment management
//!
//! Environments are Environment custom resources in the team namespace;
//! these handlers apply, list and delete them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::kube::{
    EnvironmentSource, EnvironmentSpec, Environments, PromotionStrategy, create_client,
    to_valid_name,
};

/// Options for `jx create environment`
#[derive(Debug, Clone)]
pub struct CreateEnvironmentOptions {
    /// Environment name
    pub name: String,
    /// Namespace the environment deploys into
    pub namespace: Option<String>,
    /// Position in the promotion order
    pub order: i32,
    /// Promotion strategy
    pub promotion_strategy: PromotionStrategy,
    /// Git URL of the environment repository
    pub source: Option<String>,
    /// Human-readable label
    pub label: Option<String>,
    /// Team namespace holding the resource
    pub team_namespace: String,
    /// Explicit kubeconfig path
    pub kubeconfig: Option<PathBuf>,
}

/// Creates or updates one environment
///
/// # Errors
///
/// Returns an error when the cluster is unreachable or the apply fails.
pub async fn create(opts: &CreateEnvironmentOptions) -> Result<()> {
    let spec = EnvironmentSpec {
        label: opts.label.clone().unwrap_or_else(|| capitalize(&opts.name)),
        namespace: opts
            .namespace
            .clone()
            .unwrap_or_else(|| format!("{}-{}", opts.team_namespace, to_valid_name(&opts.name))),
        order: opts.order,
        promotion_strategy: opts.promotion_strategy,
        source: opts.source.clone().map(|url| EnvironmentSource {
            url,
            git_ref: "master".to_string(),
        }),
    };

    let client = create_client(opts.kubeconfig.as_deref())
        .await
        .context("Failed to connect to the cluster")?;
    let environments = Environments::new(client, &opts.team_namespace);
    let name = environments
        .ensure(&opts.name, &spec)
        .await
        .with_context(|| format!("Failed to apply environment '{}'", opts.name))?;

    println!("Created environment {name} -> namespace {}", spec.namespace);
    Ok(())
}

/// Prints the environments table, sorted by promotion order
///
/// # Errors
///
/// Returns an error when the cluster is unreachable.
pub async fn list(kubeconfig: Option<&Path>, team_namespace: &str) -> Result<()> {
    let client = create_client(kubeconfig)
        .await
        .context("Failed to connect to the cluster")?;
    let environments = Environments::new(client, team_namespace);
    let envs = environments
        .list()
        .await
        .context("Failed to list environments")?;

    if envs.is_empty() {
        println!("No environments found in namespace {team_namespace}");
        return Ok(());
    }

    println!(
        "{:<16} {:<16} {:<24} {:<10} {}",
        "NAME", "LABEL", "NAMESPACE", "PROMOTE", "ORDER"
    );
    for (name, env) in envs {
        println!(
            "{:<16} {:<16} {:<24} {:<10} {}",
            name,
            env.label,
            env.namespace,
            format!("{:?}", env.promotion_strategy),
            env.order
        );
    }
    Ok(())
}

/// Deletes one environment by name
///
/// # Errors
///
/// Returns an error when the environment does not exist or the delete
/// fails.
pub async fn delete(kubeconfig: Option<&Path>, team_namespace: &str, name: &str) -> Result<()> {
    let client = create_client(kubeconfig)
        .await
        .context("Failed to connect to the cluster")?;
    let environments = Environments::new(client, team_namespace);
    environments
        .delete(name)
        .await
        .with_context(|| format!("Failed to delete environment '{name}'"))?;
    println!("Deleted environment {name}");
    Ok(())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("staging"), "Staging");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }
}
