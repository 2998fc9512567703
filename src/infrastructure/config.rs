//! Configuration management
//!
//! Loads and saves the jx configuration from `~/.jx/config.yaml`.
//! Missing files produce the defaults; saving creates the directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Namespace holding the platform's team resources
    pub team_namespace: String,
    /// Helm repository hosting the platform chart
    pub platform_chart_repo: String,
    /// Platform chart reference, `repo/chart` form
    pub platform_chart: String,
    /// Release name used for the platform installation
    pub platform_release: String,
    /// Default git server URL for repository commands
    pub git_server: String,
    /// Log level used when `--verbose` is not given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team_namespace: "jx".to_string(),
            platform_chart_repo: "https://charts.jenkins.io".to_string(),
            platform_chart: "jx/jx-platform".to_string(),
            platform_release: "jx".to_string(),
            git_server: "https://github.com".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default location of the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error when the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".jx").join("config.yaml"))
    }

    /// Loads the configuration, falling back to defaults when absent
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Saves the configuration, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.team_namespace, "jx");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.platform_release, "jx");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.team_namespace = "my-team".to_string();
        config.git_server = "https://gitlab.example.com".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "teamNamespace: other\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.team_namespace, "other");
        assert_eq!(config.log_level, "info");
    }
}
