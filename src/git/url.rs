//! Git clone-URL parsing
//!
//! Accepts the three URL shapes git itself accepts for the hosted
//! providers and reduces them to host + owner + repository name:
//!
//! - `https://host/owner/repo.git`
//! - `ssh://git@host/owner/repo.git`
//! - `git@host:owner/repo.git` (scp-like)
//!
//! Nested GitLab group paths keep every segment but the last as the
//! owner.

use url::Url;

use super::errors::GitError;

/// Host, owner and name extracted from a git URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepoInfo {
    /// Host name of the git server
    pub host: String,
    /// Owner path (user, organization or nested group path)
    pub owner: String,
    /// Repository name, without the `.git` suffix
    pub name: String,
}

impl GitRepoInfo {
    /// Parses a git clone URL in https, ssh or scp-like form
    ///
    /// # Errors
    ///
    /// Returns [`GitError::InvalidUrl`] when the URL has no host or no
    /// `owner/repo` path.
    pub fn parse(raw: &str) -> Result<Self, GitError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GitError::InvalidUrl {
                url: raw.to_string(),
                reason: "empty URL".to_string(),
            });
        }

        // scp-like: git@host:owner/repo.git
        if !raw.contains("://") {
            if let Some((user_host, path)) = raw.split_once(':') {
                let host = user_host.rsplit('@').next().unwrap_or(user_host);
                return Self::from_parts(raw, host, path);
            }
            return Err(GitError::InvalidUrl {
                url: raw.to_string(),
                reason: "expected https://, ssh:// or git@host:owner/repo form".to_string(),
            });
        }

        let parsed = Url::parse(raw).map_err(|e| GitError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| GitError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        })?;
        Self::from_parts(raw, host, parsed.path())
    }

    fn from_parts(raw: &str, host: &str, path: &str) -> Result<Self, GitError> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((name, owner_segments)) = segments.split_last() else {
            return Err(GitError::InvalidUrl {
                url: raw.to_string(),
                reason: "expected an owner/repository path".to_string(),
            });
        };
        if owner_segments.is_empty() {
            return Err(GitError::InvalidUrl {
                url: raw.to_string(),
                reason: "expected an owner/repository path".to_string(),
            });
        }

        Ok(Self {
            host: host.to_string(),
            owner: owner_segments.join("/"),
            name: (*name).to_string(),
        })
    }

    /// Returns the canonical HTTPS clone URL for this repository
    #[must_use]
    pub fn https_url(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn info(host: &str, owner: &str, name: &str) -> GitRepoInfo {
        GitRepoInfo {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_https() {
        assert_eq!(
            GitRepoInfo::parse("https://github.com/jx-org/jx").unwrap(),
            info("github.com", "jx-org", "jx")
        );
        assert_eq!(
            GitRepoInfo::parse("https://github.com/jx-org/jx.git").unwrap(),
            info("github.com", "jx-org", "jx")
        );
        assert_eq!(
            GitRepoInfo::parse("https://github.com/jx-org/jx/").unwrap(),
            info("github.com", "jx-org", "jx")
        );
    }

    #[test]
    fn test_parse_ssh() {
        assert_eq!(
            GitRepoInfo::parse("ssh://git@gitlab.com/group/project.git").unwrap(),
            info("gitlab.com", "group", "project")
        );
    }

    #[test]
    fn test_parse_scp_like() {
        assert_eq!(
            GitRepoInfo::parse("git@github.com:jx-org/jx.git").unwrap(),
            info("github.com", "jx-org", "jx")
        );
    }

    #[test]
    fn test_parse_nested_group() {
        assert_eq!(
            GitRepoInfo::parse("https://gitlab.com/group/subgroup/project").unwrap(),
            info("gitlab.com", "group/subgroup", "project")
        );
    }

    #[test]
    fn test_parse_rejects_missing_owner() {
        assert!(GitRepoInfo::parse("https://github.com/only-one").is_err());
        assert!(GitRepoInfo::parse("https://github.com/").is_err());
        assert!(GitRepoInfo::parse("").is_err());
        assert!(GitRepoInfo::parse("not a url at all").is_err());
    }

    #[test]
    fn test_https_url() {
        let repo = info("github.com", "jx-org", "jx");
        assert_eq!(repo.https_url(), "https://github.com/jx-org/jx.git");
    }
}
