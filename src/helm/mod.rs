//! Helm chart operations
//!
//! Wraps the `helm` binary for the chart work jx performs: installing
//! the platform, promoting application charts and inspecting releases.
//! Helm's own behavior is never reimplemented; every operation builds
//! an argument vector and runs the binary through
//! [`crate::process::CommandRunner`].

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::process::{CommandOutput, CommandRunner, ProcessError};

/// Errors from helm invocations
#[derive(Error, Debug)]
pub enum HelmError {
    /// The helm binary is not on the PATH
    #[error("helm binary '{binary}' not found; install helm and ensure it is on the PATH")]
    NotInstalled {
        /// Binary name that was probed.
        binary: String,
    },

    /// The helm invocation failed
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Helm output could not be parsed
    #[error("Failed to parse helm output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One installed release as reported by `helm list`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HelmRelease {
    /// Release name
    pub name: String,
    /// Namespace the release is installed into
    pub namespace: String,
    /// Release revision
    pub revision: String,
    /// Release status (`deployed`, `failed`, ...)
    pub status: String,
    /// Chart name and version, `chart-1.2.3` form
    pub chart: String,
    /// Application version packaged by the chart
    #[serde(default)]
    pub app_version: String,
}

/// Client for the helm binary
#[derive(Debug, Clone)]
pub struct HelmClient {
    runner: CommandRunner,
    binary: String,
    kubeconfig: Option<PathBuf>,
}

impl Default for HelmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmClient {
    /// Creates a client using `helm` from the PATH
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: CommandRunner::new(),
            binary: "helm".to_string(),
            kubeconfig: None,
        }
    }

    /// Overrides the binary name, mainly for tests
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Points helm at an explicit kubeconfig file
    #[must_use]
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput, HelmError> {
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        full.extend_from_slice(args);
        let kubeconfig = self.kubeconfig.as_ref().map(|p| p.display().to_string());
        if let Some(ref kubeconfig) = kubeconfig {
            full.push("--kubeconfig");
            full.push(kubeconfig.as_str());
        }
        let output = self.runner.run_checked(&self.binary, &full).await;
        match output {
            Err(ProcessError::Spawn { .. }) => Err(HelmError::NotInstalled {
                binary: self.binary.clone(),
            }),
            other => Ok(other?),
        }
    }

    /// Returns the helm version string, probing availability
    ///
    /// # Errors
    ///
    /// Returns [`HelmError::NotInstalled`] when the binary is missing.
    pub async fn version(&self) -> Result<String, HelmError> {
        let output = self
            .run(&["version", "--short"])
            .await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Registers a chart repository
    ///
    /// # Errors
    ///
    /// Returns an error when the helm invocation fails.
    pub async fn add_repo(&self, name: &str, url: &str) -> Result<(), HelmError> {
        self.run(&["repo", "add", name, url]).await?;
        tracing::debug!("Added helm repository {name} -> {url}");
        Ok(())
    }

    /// Refreshes all chart repositories
    ///
    /// # Errors
    ///
    /// Returns an error when the helm invocation fails.
    pub async fn update_repos(&self) -> Result<(), HelmError> {
        self.run(&["repo", "update"]).await?;
        Ok(())
    }

    /// Installs or upgrades a release (`helm upgrade --install`)
    ///
    /// Set-values are passed as `--set key=value` pairs; `version` pins
    /// the chart version. The target namespace is created when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the helm invocation fails.
    pub async fn upgrade_install(
        &self,
        release: &str,
        chart: &str,
        namespace: &str,
        set_values: &[(String, String)],
        version: Option<&str>,
    ) -> Result<(), HelmError> {
        let mut args: Vec<String> = vec![
            "upgrade".to_string(),
            "--install".to_string(),
            release.to_string(),
            chart.to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
            "--create-namespace".to_string(),
        ];
        if let Some(version) = version {
            args.push("--version".to_string());
            args.push(version.to_string());
        }
        for (key, value) in set_values {
            args.push("--set".to_string());
            args.push(format!("{key}={value}"));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).await?;
        tracing::info!("Installed release {release} ({chart}) into {namespace}");
        Ok(())
    }

    /// Uninstalls a release from a namespace
    ///
    /// # Errors
    ///
    /// Returns an error when the helm invocation fails.
    pub async fn uninstall(&self, release: &str, namespace: &str) -> Result<(), HelmError> {
        self.run(&["uninstall", release, "--namespace", namespace])
            .await?;
        Ok(())
    }

    /// Lists releases in a namespace
    ///
    /// # Errors
    ///
    /// Returns an error when the invocation fails or the JSON output
    /// cannot be parsed.
    pub async fn list(&self, namespace: &str) -> Result<Vec<HelmRelease>, HelmError> {
        let output = self
            .run(&["list", "--namespace", namespace, "-o", "json"])
            .await?;
        Ok(parse_releases(&output.stdout)?)
    }

    /// Returns the status text of a release
    ///
    /// # Errors
    ///
    /// Returns an error when the helm invocation fails.
    pub async fn status(&self, release: &str, namespace: &str) -> Result<String, HelmError> {
        let output = self
            .run(&["status", release, "--namespace", namespace])
            .await?;
        Ok(output.stdout)
    }
}

fn parse_releases(json: &str) -> Result<Vec<HelmRelease>, serde_json::Error> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_releases() {
        let json = r#"[
            {
                "name": "jx",
                "namespace": "jx",
                "revision": "2",
                "status": "deployed",
                "chart": "jx-platform-0.9.1",
                "app_version": "0.9.1"
            },
            {
                "name": "my-app",
                "namespace": "jx-staging",
                "revision": "14",
                "status": "deployed",
                "chart": "my-app-1.2.3"
            }
        ]"#;
        let releases = parse_releases(json).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].name, "jx");
        assert_eq!(releases[1].chart, "my-app-1.2.3");
        assert_eq!(releases[1].app_version, "");
    }

    #[test]
    fn test_parse_empty_output() {
        assert_eq!(parse_releases("").unwrap(), Vec::new());
        assert_eq!(parse_releases("  \n").unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_not_installed() {
        let client = HelmClient::new().with_binary("definitely-not-helm");
        let err = client.version().await.unwrap_err();
        assert!(matches!(err, HelmError::NotInstalled { .. }));
    }

    #[tokio::test]
    async fn test_run_appends_kubeconfig() {
        // `echo` stands in for helm so the argument plumbing is observable
        let client = HelmClient::new()
            .with_binary("echo")
            .with_kubeconfig("/tmp/kubeconfig");
        let version = client.version().await.unwrap();
        assert_eq!(version, "version --short --kubeconfig /tmp/kubeconfig");
    }
}
