//! `jx create repo` / `jx fork` / `jx import` - Repository workflows
//!
//! Developer-facing git plumbing: creating repositories on the
//! configured server, fork-and-clone with an upstream remote, and
//! pushing a local repository to a fresh remote.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::git::{
    AuthConfig, AuthServer, CreateRepository, create_provider, provider_for_url,
};
use crate::kube::{Activities, create_client};
use crate::process::CommandRunner;

/// Options for `jx create repo`
#[derive(Debug, Clone)]
pub struct CreateRepoOptions {
    /// Repository name
    pub name: String,
    /// Organization to create under
    pub owner: Option<String>,
    /// Create as private
    pub private: bool,
    /// Repository description
    pub description: Option<String>,
    /// Git server URL to create on
    pub server: String,
}

/// Resolves the provider for the configured server URL
fn provider_for_server(
    auth: &AuthConfig,
    server: &str,
) -> Result<Box<dyn crate::git::GitProvider>> {
    let entry = auth
        .servers
        .iter()
        .find(|s| s.url == server)
        .or_else(|| auth.current_server());
    let Some(entry) = entry else {
        bail!("no git server configured; add credentials for {server} first");
    };
    let user = entry
        .current_auth()
        .with_context(|| format!("no credentials configured for {}", entry.url))?;
    Ok(create_provider(&entry.url, entry.kind, user)?)
}

/// Creates a repository on the configured git server
///
/// # Errors
///
/// Returns an error when no credentials are configured or the provider
/// call fails.
pub async fn create_repo(opts: &CreateRepoOptions) -> Result<()> {
    let auth = AuthConfig::load(&AuthConfig::default_path()?)?;
    let provider = provider_for_server(&auth, &opts.server)?;

    let repo = provider
        .create_repository(&CreateRepository {
            name: opts.name.clone(),
            owner: opts.owner.clone(),
            description: opts.description.clone(),
            private: opts.private,
        })
        .await
        .with_context(|| format!("Failed to create repository '{}'", opts.name))?;

    println!("Created repository {}: {}", repo.full_name(), repo.clone_url);
    Ok(())
}

/// Forks a repository, clones the fork and wires the upstream remote
///
/// # Errors
///
/// Returns an error when the URL cannot be resolved to a provider, the
/// fork fails, or the clone fails.
pub async fn fork(url: &str, dir: Option<&Path>) -> Result<()> {
    let auth = AuthConfig::load(&AuthConfig::default_path()?)?;
    let (provider, info) = provider_for_url(&auth, url)?;

    let fork = provider
        .fork_repository(&info.owner, &info.name)
        .await
        .with_context(|| format!("Failed to fork {}/{}", info.owner, info.name))?;
    println!("Forked {} -> {}", info.owner, fork.full_name());

    let target = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(&info.name).to_path_buf());
    let target_str = target.display().to_string();

    let runner = CommandRunner::new();
    runner
        .run_checked("git", &["clone", &fork.clone_url, &target_str])
        .await
        .context("Failed to clone the fork")?;

    let upstream = info.https_url();
    CommandRunner::new()
        .with_cwd(&target)
        .run_checked("git", &["remote", "add", "upstream", &upstream])
        .await
        .context("Failed to add the upstream remote")?;

    println!("Cloned fork into {target_str} (upstream -> {upstream})");
    Ok(())
}

/// Pushes a local repository to a newly created remote and registers it
///
/// # Errors
///
/// Returns an error when the directory is not a git repository, the
/// remote cannot be created, or the push fails.
pub async fn import(
    dir: Option<&Path>,
    name: Option<&str>,
    kubeconfig: Option<&Path>,
    team_namespace: &str,
) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };
    if !dir.join(".git").exists() {
        bail!("{} is not a git repository", dir.display());
    }

    let repo_name = match name {
        Some(name) => name.to_string(),
        None => dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .context("Cannot derive a repository name from the directory")?,
    };

    let auth = AuthConfig::load(&AuthConfig::default_path()?)?;
    let Some(server) = auth.current_server().map(AuthServer::clone) else {
        bail!("no git server configured; add credentials first");
    };
    let user = server
        .current_auth()
        .with_context(|| format!("no credentials configured for {}", server.url))?;
    let provider = create_provider(&server.url, server.kind, user)?;

    let repo = provider
        .create_repository(&CreateRepository {
            name: repo_name.clone(),
            owner: None,
            description: None,
            private: false,
        })
        .await
        .with_context(|| format!("Failed to create repository '{repo_name}'"))?;

    let runner = CommandRunner::new().with_cwd(&dir);
    // An existing origin points somewhere else; refuse to clobber it
    let has_origin = runner
        .run("git", &["remote", "get-url", "origin"])
        .await
        .map(|out| out.is_success())
        .unwrap_or(false);
    if has_origin {
        bail!(
            "{} already has an origin remote; remove it before importing",
            dir.display()
        );
    }
    runner
        .run_checked("git", &["remote", "add", "origin", &repo.clone_url])
        .await
        .context("Failed to add the origin remote")?;
    runner
        .run_checked("git", &["push", "-u", "origin", "HEAD"])
        .await
        .context("Failed to push to the new remote")?;

    println!("Imported {} -> {}", dir.display(), repo.clone_url);

    // Register the pipeline so the activity feed shows the project
    let pipeline = format!("{}/{}/master", repo.owner, repo.name);
    match create_client(kubeconfig).await {
        Ok(client) => {
            let activities = Activities::new(client, team_namespace);
            let (activity, build) = activities
                .register(&pipeline)
                .await
                .with_context(|| format!("Failed to register pipeline '{pipeline}'"))?;
            println!("Registered pipeline {pipeline} build #{build} (activity {activity})");
        }
        Err(e) => {
            tracing::warn!("Cluster unreachable, skipping pipeline registration: {e}");
        }
    }

    Ok(())
}
