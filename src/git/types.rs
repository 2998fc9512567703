//! Core types for the git provider domain
//!
//! These types are the provider-neutral currency of the [`crate::git`]
//! module: every REST implementation maps its wire format into them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of git hosting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitKind {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab (SaaS or self-hosted)
    GitLab,
    /// BitBucket Cloud
    BitBucket,
    /// Gitea
    Gitea,
}

impl GitKind {
    /// Detects the provider kind from a host name
    ///
    /// Unknown hosts return `None`; callers must then be told the kind
    /// explicitly.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        if host == "github.com" || host.starts_with("github.") {
            Some(Self::GitHub)
        } else if host == "gitlab.com" || host.starts_with("gitlab.") {
            Some(Self::GitLab)
        } else if host.starts_with("bitbucket.") {
            Some(Self::BitBucket)
        } else if host.starts_with("gitea.") {
            Some(Self::Gitea)
        } else {
            None
        }
    }
}

impl fmt::Display for GitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
            Self::BitBucket => write!(f, "bitbucket"),
            Self::Gitea => write!(f, "gitea"),
        }
    }
}

/// Authenticated user as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitUser {
    /// Login name used in repository paths
    pub login: String,
    /// Display name, when the provider reports one
    pub name: Option<String>,
    /// Email address, when the provider reports one
    pub email: Option<String>,
}

/// Repository as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Owner (user or organization) of the repository
    pub owner: String,
    /// Repository name
    pub name: String,
    /// HTTPS clone URL
    pub clone_url: String,
    /// Browser URL
    pub html_url: String,
    /// SSH clone URL, when reported
    pub ssh_url: Option<String>,
    /// Whether the repository is private
    pub private: bool,
    /// Whether the repository is a fork
    pub fork: bool,
    /// Repository description
    pub description: Option<String>,
}

impl GitRepository {
    /// Returns the `owner/name` form of the repository
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Request to create a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRepository {
    /// Repository name
    pub name: String,
    /// Organization to create under; the authenticated user when `None`
    pub owner: Option<String>,
    /// Repository description
    pub description: Option<String>,
    /// Whether the repository should be private
    pub private: bool,
}

/// Request to open a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    /// Pull request title
    pub title: String,
    /// Pull request body
    pub body: Option<String>,
    /// Source branch
    pub head: String,
    /// Target branch
    pub base: String,
}

/// Pull request as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Provider-assigned number
    pub number: u64,
    /// Browser URL of the pull request
    pub url: String,
    /// Pull request title
    pub title: String,
    /// Current state (`open`, `closed`, `merged`, ...)
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_from_host() {
        assert_eq!(GitKind::from_host("github.com"), Some(GitKind::GitHub));
        assert_eq!(
            GitKind::from_host("github.example.corp"),
            Some(GitKind::GitHub)
        );
        assert_eq!(GitKind::from_host("GitLab.com"), Some(GitKind::GitLab));
        assert_eq!(
            GitKind::from_host("gitlab.internal.io"),
            Some(GitKind::GitLab)
        );
        assert_eq!(
            GitKind::from_host("bitbucket.org"),
            Some(GitKind::BitBucket)
        );
        assert_eq!(GitKind::from_host("gitea.example.com"), Some(GitKind::Gitea));
        assert_eq!(GitKind::from_host("git.example.com"), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(GitKind::GitHub.to_string(), "github");
        assert_eq!(GitKind::BitBucket.to_string(), "bitbucket");
    }

    #[test]
    fn test_repository_full_name() {
        let repo = GitRepository {
            owner: "jx-org".to_string(),
            name: "jx".to_string(),
            clone_url: "https://github.com/jx-org/jx.git".to_string(),
            html_url: "https://github.com/jx-org/jx".to_string(),
            ssh_url: None,
            private: false,
            fork: false,
            description: None,
        };
        assert_eq!(repo.full_name(), "jx-org/jx");
    }
}
