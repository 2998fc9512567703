//! `jx promote` - Promote an application version into an environment
//!
//! The target environment's promotion strategy decides the mechanics:
//!
//! - `Never`: the command refuses
//! - `Auto`: the application chart is upgraded directly into the
//!   environment's namespace
//! - `Manual`: the environment repository is cloned, the application
//!   version bumped in `env/requirements.yaml` on a fresh branch, and a
//!   pull request opened for review
//!
//! ## Usage
//!
//! ```bash
//! jx promote --app my-app --version 1.2.3 --env staging
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::git::{
    AuthConfig, CreatePullRequest, provider_for_url, sanitize_branch_name,
};
use crate::helm::HelmClient;
use crate::kube::{Environments, PromotionStrategy, create_client};
use crate::process::CommandRunner;

/// Relative path of the version manifest in environment repositories
const REQUIREMENTS_FILE: &str = "env/requirements.yaml";

/// Options for the promote command
#[derive(Debug, Clone)]
pub struct PromoteOptions {
    /// Application to promote
    pub app: String,
    /// Version to promote
    pub version: String,
    /// Target environment name
    pub env: String,
    /// Chart reference for direct upgrades
    pub chart: Option<String>,
    /// Team namespace holding the Environment resource
    pub team_namespace: String,
    /// Explicit kubeconfig path
    pub kubeconfig: Option<PathBuf>,
}

/// Promotes an application version into an environment
///
/// # Errors
///
/// Returns an error when the environment does not exist, refuses
/// promotion, or the underlying helm/git operations fail.
pub async fn promote(opts: &PromoteOptions) -> Result<()> {
    let client = create_client(opts.kubeconfig.as_deref())
        .await
        .context("Failed to connect to the cluster")?;
    let environments = Environments::new(client, &opts.team_namespace);
    let env = environments
        .get(&opts.env)
        .await
        .with_context(|| format!("Environment '{}' not found", opts.env))?;

    match env.promotion_strategy {
        PromotionStrategy::Never => {
            bail!(
                "environment '{}' does not allow promotion (strategy Never)",
                opts.env
            );
        }
        PromotionStrategy::Auto => {
            promote_via_helm(opts, &env.namespace).await?;
        }
        PromotionStrategy::Manual => {
            let source = env.source.as_ref().with_context(|| {
                format!(
                    "environment '{}' has no source repository to open a pull request against",
                    opts.env
                )
            })?;
            promote_via_pull_request(opts, &source.url, &source.git_ref).await?;
        }
    }
    Ok(())
}

/// Upgrades the application chart directly into the environment
async fn promote_via_helm(opts: &PromoteOptions, namespace: &str) -> Result<()> {
    let chart = opts
        .chart
        .clone()
        .unwrap_or_else(|| format!("jx/{}", opts.app));
    let mut helm = HelmClient::new();
    if let Some(ref kubeconfig) = opts.kubeconfig {
        helm = helm.with_kubeconfig(kubeconfig);
    }
    helm.upgrade_install(&opts.app, &chart, namespace, &[], Some(&opts.version))
        .await
        .with_context(|| format!("Failed to upgrade {} to {}", opts.app, opts.version))?;
    println!(
        "Promoted {} {} into namespace {namespace}",
        opts.app, opts.version
    );
    Ok(())
}

/// Opens a version-bump pull request against the environment repository
async fn promote_via_pull_request(
    opts: &PromoteOptions,
    source_url: &str,
    base_ref: &str,
) -> Result<()> {
    let auth = AuthConfig::load(&AuthConfig::default_path()?)?;
    let (provider, info) = provider_for_url(&auth, source_url)?;

    let workdir = std::env::temp_dir().join(format!("jx-promote-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&workdir)
        .with_context(|| format!("Failed to create {}", workdir.display()))?;
    let checkout = workdir.join(&info.name);
    let checkout_str = checkout.display().to_string();

    let runner = CommandRunner::new();
    runner
        .run_checked("git", &["clone", source_url, &checkout_str])
        .await
        .context("Failed to clone the environment repository")?;

    let branch = sanitize_branch_name(&format!(
        "promote-{}-{}-{}",
        opts.app,
        opts.version,
        short_id()
    ));
    let repo_runner = CommandRunner::new().with_cwd(&checkout);
    repo_runner
        .run_checked("git", &["checkout", "-b", &branch])
        .await
        .context("Failed to create the promotion branch")?;

    let manifest = checkout.join(REQUIREMENTS_FILE);
    let contents = std::fs::read_to_string(&manifest)
        .with_context(|| format!("Failed to read {}", manifest.display()))?;
    let updated = bump_requirement(&contents, &opts.app, &opts.version)
        .context("Failed to update the version manifest")?;
    std::fs::write(&manifest, updated)
        .with_context(|| format!("Failed to write {}", manifest.display()))?;

    let message = format!("chore: promote {} to {}", opts.app, opts.version);
    repo_runner
        .run_checked("git", &["add", REQUIREMENTS_FILE])
        .await?;
    repo_runner
        .run_checked("git", &["commit", "-m", &message])
        .await
        .context("Failed to commit the version bump")?;
    repo_runner
        .run_checked("git", &["push", "origin", &branch])
        .await
        .context("Failed to push the promotion branch")?;

    let pull = provider
        .create_pull_request(
            &info.owner,
            &info.name,
            &CreatePullRequest {
                title: message.clone(),
                body: Some(format!(
                    "Promotes `{}` to version `{}` in environment `{}`.",
                    opts.app, opts.version, opts.env
                )),
                head: branch,
                base: base_ref.to_string(),
            },
        )
        .await
        .context("Failed to open the promotion pull request")?;

    println!(
        "Created pull request #{} for {} {}: {}",
        pull.number, opts.app, opts.version, pull.url
    );
    Ok(())
}

fn short_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Requirements {
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Dependency {
    name: String,
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
}

/// Rewrites the version of one dependency, adding it when missing
fn bump_requirement(yaml: &str, app: &str, version: &str) -> Result<String> {
    let mut requirements: Requirements = if yaml.trim().is_empty() {
        Requirements::default()
    } else {
        serde_yaml::from_str(yaml).context("invalid requirements file")?
    };
    match requirements
        .dependencies
        .iter_mut()
        .find(|d| d.name == app)
    {
        Some(dependency) => dependency.version = version.to_string(),
        None => requirements.dependencies.push(Dependency {
            name: app.to_string(),
            version: version.to_string(),
            repository: None,
        }),
    }
    serde_yaml::to_string(&requirements).context("failed to serialize requirements")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bump_existing_dependency() {
        let yaml = "dependencies:\n- name: my-app\n  version: 1.0.0\n  repository: https://charts.example.com\n- name: other\n  version: 2.0.0\n";
        let updated = bump_requirement(yaml, "my-app", "1.2.3").unwrap();
        let parsed: Requirements = serde_yaml::from_str(&updated).unwrap();
        assert_eq!(parsed.dependencies[0].version, "1.2.3");
        assert_eq!(
            parsed.dependencies[0].repository.as_deref(),
            Some("https://charts.example.com")
        );
        assert_eq!(parsed.dependencies[1].version, "2.0.0");
    }

    #[test]
    fn test_bump_adds_missing_dependency() {
        let updated = bump_requirement("dependencies: []\n", "new-app", "0.1.0").unwrap();
        let parsed: Requirements = serde_yaml::from_str(&updated).unwrap();
        assert_eq!(parsed.dependencies.len(), 1);
        assert_eq!(parsed.dependencies[0].name, "new-app");
        assert_eq!(parsed.dependencies[0].version, "0.1.0");
    }

    #[test]
    fn test_bump_empty_file() {
        let updated = bump_requirement("", "app", "1.0.0").unwrap();
        let parsed: Requirements = serde_yaml::from_str(&updated).unwrap();
        assert_eq!(parsed.dependencies.len(), 1);
    }

    #[test]
    fn test_bump_rejects_malformed_yaml() {
        assert!(bump_requirement("dependencies: {not: [a, list", "a", "1").is_err());
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(short_id().len(), 8);
    }
}
