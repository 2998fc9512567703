//! `jx install` - Bootstrap the platform into a cluster
//!
//! Verifies helm is available, installs or upgrades the platform chart
//! and creates the default environments. Re-running converges: the
//! chart upgrade and the server-side apply of environments are both
//! idempotent.
//!
//! ## Usage
//!
//! ```bash
//! jx install
//! jx install --chart-repo https://charts.example.com --version 0.9.1
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use kube::Client;
use url::Url;

use crate::git::GitKind;
use crate::helm::HelmClient;
use crate::infrastructure::generate_secret;
use crate::kube::{
    Environments, GitServiceSpec, ResourceClient, create_client, default_environments,
    to_valid_name,
};

/// Length of the generated admin and webhook secrets
const SECRET_LEN: usize = 24;

/// Options for the install command
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Team namespace to install into
    pub namespace: String,
    /// Explicit kubeconfig path
    pub kubeconfig: Option<PathBuf>,
    /// Chart repository hosting the platform chart
    pub chart_repo: String,
    /// Platform chart reference
    pub chart: String,
    /// Release name for the platform installation
    pub release: String,
    /// Chart version to pin, latest when `None`
    pub version: Option<String>,
    /// Skip creating the default environments
    pub no_default_environments: bool,
    /// Default git server to record as a GitService resource
    pub git_server: String,
}

/// Installs the platform and its default environments
///
/// # Errors
///
/// Returns an error when helm is unavailable, the chart install fails
/// or the environment resources cannot be applied.
pub async fn install(opts: &InstallOptions) -> Result<()> {
    let mut helm = HelmClient::new();
    if let Some(ref kubeconfig) = opts.kubeconfig {
        helm = helm.with_kubeconfig(kubeconfig);
    }

    let helm_version = helm
        .version()
        .await
        .context("helm is required to install the platform")?;
    tracing::debug!("Using helm {helm_version}");

    let repo_alias = opts
        .chart
        .split_once('/')
        .map_or("jx", |(alias, _)| alias);
    helm.add_repo(repo_alias, &opts.chart_repo)
        .await
        .context("Failed to add the platform chart repository")?;
    helm.update_repos()
        .await
        .context("Failed to update chart repositories")?;

    let set_values = vec![
        ("adminPassword".to_string(), generate_secret(SECRET_LEN)),
        ("webhookSecret".to_string(), generate_secret(SECRET_LEN)),
    ];
    helm.upgrade_install(
        &opts.release,
        &opts.chart,
        &opts.namespace,
        &set_values,
        opts.version.as_deref(),
    )
    .await
    .context("Failed to install the platform chart")?;

    println!(
        "Installed platform release '{}' into namespace {}",
        opts.release, opts.namespace
    );

    if opts.no_default_environments {
        tracing::debug!("Skipping default environment creation");
        return Ok(());
    }

    let client = create_client(opts.kubeconfig.as_deref())
        .await
        .context("Failed to connect to the cluster")?;
    let environments = Environments::new(client.clone(), &opts.namespace);
    for (name, spec) in default_environments(&opts.namespace) {
        let applied = environments
            .ensure(&name, &spec)
            .await
            .with_context(|| format!("Failed to create environment '{name}'"))?;
        println!("Created environment {applied} -> namespace {}", spec.namespace);
    }

    register_git_service(client, &opts.namespace, &opts.git_server).await?;

    Ok(())
}

/// Records the configured git server as a GitService resource
///
/// The platform reads GitService objects to know which webhooks to
/// expect. Unknown hosts are skipped with a warning rather than
/// guessed at.
async fn register_git_service(client: Client, namespace: &str, server: &str) -> Result<()> {
    let Some(host) = Url::parse(server).ok().and_then(|u| u.host_str().map(str::to_string))
    else {
        tracing::warn!("Git server URL '{server}' has no host, skipping GitService");
        return Ok(());
    };
    let Some(kind) = GitKind::from_host(&host) else {
        tracing::warn!("Unknown git provider for host '{host}', skipping GitService");
        return Ok(());
    };

    let services: ResourceClient<GitServiceSpec> = ResourceClient::new(client, namespace);
    let spec = GitServiceSpec {
        url: server.to_string(),
        git_kind: kind.to_string(),
    };
    services
        .apply(&to_valid_name(&host), &spec)
        .await
        .with_context(|| format!("Failed to record git service for {host}"))?;
    tracing::debug!("Recorded GitService {host} ({kind})");
    Ok(())
}
