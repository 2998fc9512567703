//! Git server auth configuration
//!
//! jx keeps API tokens for every configured git server in
//! `~/.jx/gitAuth.yaml`. A server holds one or more users; the current
//! server/user selection picks the defaults for repository commands.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::GitError;
use super::types::GitKind;

/// A username/token pair for one git server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAuth {
    /// Login name on the server
    pub username: String,
    /// API token used for REST calls and HTTPS pushes
    pub api_token: String,
}

/// One configured git server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthServer {
    /// Base URL of the server, e.g. `https://github.com`
    pub url: String,
    /// Provider kind of the server
    pub kind: GitKind,
    /// Users configured for this server
    #[serde(default)]
    pub users: Vec<UserAuth>,
    /// Username selected as the default for this server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

impl AuthServer {
    /// Returns the host portion of the server URL
    #[must_use]
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Returns the selected user, falling back to the first configured
    #[must_use]
    pub fn current_auth(&self) -> Option<&UserAuth> {
        match &self.current_user {
            Some(login) => self.users.iter().find(|u| &u.username == login),
            None => self.users.first(),
        }
    }
}

/// Auth configuration for all git servers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Configured servers
    #[serde(default)]
    pub servers: Vec<AuthServer>,
    /// URL of the server selected as the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_server: Option<String>,
}

impl AuthConfig {
    /// Default location of the auth configuration file
    ///
    /// # Errors
    ///
    /// Returns an error when the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, GitError> {
        let home = dirs::home_dir()
            .ok_or_else(|| GitError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".jx").join("gitAuth.yaml"))
    }

    /// Loads the auth configuration, empty when the file is absent
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, GitError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GitError::Config(format!("failed to read {}: {e}", path.display())))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| GitError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Saves the auth configuration, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), GitError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GitError::Config(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let contents = serde_yaml::to_string(self)
            .map_err(|e| GitError::Config(format!("failed to serialize auth config: {e}")))?;
        std::fs::write(path, contents)
            .map_err(|e| GitError::Config(format!("failed to write {}: {e}", path.display())))
    }

    /// Finds the server entry whose host matches the given host name
    #[must_use]
    pub fn server_for_host(&self, host: &str) -> Option<&AuthServer> {
        self.servers
            .iter()
            .find(|s| s.host().is_some_and(|h| h.eq_ignore_ascii_case(host)))
    }

    /// Returns the selected server, falling back to the first configured
    #[must_use]
    pub fn current_server(&self) -> Option<&AuthServer> {
        match &self.current_server {
            Some(url) => self.servers.iter().find(|s| &s.url == url),
            None => self.servers.first(),
        }
    }

    /// Adds or updates a user on a server entry, creating the entry
    pub fn upsert_user(&mut self, url: &str, kind: GitKind, user: UserAuth) {
        if let Some(server) = self.servers.iter_mut().find(|s| s.url == url) {
            if let Some(existing) = server
                .users
                .iter_mut()
                .find(|u| u.username == user.username)
            {
                existing.api_token = user.api_token;
            } else {
                server.users.push(user);
            }
        } else {
            self.servers.push(AuthServer {
                url: url.to_string(),
                kind,
                users: vec![user],
                current_user: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> AuthConfig {
        AuthConfig {
            servers: vec![
                AuthServer {
                    url: "https://github.com".to_string(),
                    kind: GitKind::GitHub,
                    users: vec![
                        UserAuth {
                            username: "alice".to_string(),
                            api_token: "token-a".to_string(),
                        },
                        UserAuth {
                            username: "bob".to_string(),
                            api_token: "token-b".to_string(),
                        },
                    ],
                    current_user: Some("bob".to_string()),
                },
                AuthServer {
                    url: "https://gitlab.example.com".to_string(),
                    kind: GitKind::GitLab,
                    users: vec![UserAuth {
                        username: "carol".to_string(),
                        api_token: "token-c".to_string(),
                    }],
                    current_user: None,
                },
            ],
            current_server: Some("https://gitlab.example.com".to_string()),
        }
    }

    #[test]
    fn test_server_for_host() {
        let config = sample();
        let server = config.server_for_host("github.com").unwrap();
        assert_eq!(server.kind, GitKind::GitHub);
        assert_eq!(config.server_for_host("GITHUB.COM").unwrap().url, server.url);
        assert!(config.server_for_host("unknown.io").is_none());
    }

    #[test]
    fn test_current_selection() {
        let config = sample();
        let server = config.current_server().unwrap();
        assert_eq!(server.url, "https://gitlab.example.com");
        assert_eq!(server.current_auth().unwrap().username, "carol");

        let github = config.server_for_host("github.com").unwrap();
        assert_eq!(github.current_auth().unwrap().username, "bob");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gitAuth.yaml");
        let config = sample();
        config.save(&path).unwrap();
        let loaded = AuthConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuthConfig::load(&dir.path().join("missing.yaml")).unwrap();
        assert!(config.servers.is_empty());
    }

    #[test]
    fn test_upsert_user() {
        let mut config = AuthConfig::default();
        config.upsert_user(
            "https://gitea.example.com",
            GitKind::Gitea,
            UserAuth {
                username: "dan".to_string(),
                api_token: "old".to_string(),
            },
        );
        config.upsert_user(
            "https://gitea.example.com",
            GitKind::Gitea,
            UserAuth {
                username: "dan".to_string(),
                api_token: "new".to_string(),
            },
        );
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].users.len(), 1);
        assert_eq!(config.servers[0].users[0].api_token, "new");
    }
}
