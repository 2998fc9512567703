//! Git provider abstraction
//!
//! Everything jx knows about git hosting services lives here:
//!
//! - [`provider`]: the [`GitProvider`] trait and response plumbing
//! - [`github`], [`gitlab`], [`bitbucket`], [`gitea`]: one REST
//!   implementation per supported service
//! - [`auth`]: token configuration persisted at `~/.jx/gitAuth.yaml`
//! - [`credentials`]: git credential-store file rendering
//! - [`url`]: clone-URL parsing
//! - [`branch`]: branch-name sanitization
//!
//! Providers are constructed through [`create_provider`] from a server
//! URL, a kind and a token, or resolved end-to-end from a repository URL
//! with [`provider_for_url`].

pub mod auth;
pub mod bitbucket;
pub mod branch;
pub mod credentials;
pub mod errors;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod provider;
pub mod types;
pub mod url;

pub use auth::{AuthConfig, AuthServer, UserAuth};
pub use bitbucket::BitBucketProvider;
pub use branch::sanitize_branch_name;
pub use credentials::render_credentials;
pub use errors::GitError;
pub use gitea::GiteaProvider;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use provider::GitProvider;
pub use types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};
pub use self::url::GitRepoInfo;

/// Creates a provider client for a server, kind and credentials
///
/// # Errors
///
/// Returns an error when the server URL is invalid or the credentials
/// cannot form HTTP headers.
pub fn create_provider(
    server: &str,
    kind: GitKind,
    auth: &UserAuth,
) -> Result<Box<dyn GitProvider>, GitError> {
    Ok(match kind {
        GitKind::GitHub => Box::new(GitHubProvider::new(server, &auth.api_token)?),
        GitKind::GitLab => Box::new(GitLabProvider::new(server, &auth.api_token)?),
        GitKind::BitBucket => Box::new(BitBucketProvider::new(
            server,
            &auth.username,
            &auth.api_token,
        )?),
        GitKind::Gitea => Box::new(GiteaProvider::new(server, &auth.api_token)?),
    })
}

/// Resolves the provider and repository coordinates for a git URL
///
/// The host picks the configured auth server when one matches;
/// otherwise the kind is detected from the host name and the call fails
/// when no credentials are configured.
///
/// # Errors
///
/// Returns [`GitError::UnknownProvider`] for hosts that match neither
/// configuration nor a known provider pattern, and
/// [`GitError::Config`] when the matched server has no usable token.
pub fn provider_for_url(
    config: &AuthConfig,
    raw_url: &str,
) -> Result<(Box<dyn GitProvider>, GitRepoInfo), GitError> {
    let info = GitRepoInfo::parse(raw_url)?;

    let server = config.server_for_host(&info.host);
    let kind = server
        .map(|s| s.kind)
        .or_else(|| GitKind::from_host(&info.host))
        .ok_or_else(|| GitError::UnknownProvider {
            host: info.host.clone(),
        })?;

    let auth = server
        .and_then(AuthServer::current_auth)
        .ok_or_else(|| {
            GitError::Config(format!(
                "no credentials configured for {}; run `jx create git token`",
                info.host
            ))
        })?;

    let server_url = server
        .map(|s| s.url.clone())
        .unwrap_or_else(|| format!("https://{}", info.host));

    let provider = create_provider(&server_url, kind, auth)?;
    Ok((provider, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with(url: &str, kind: GitKind) -> AuthConfig {
        AuthConfig {
            servers: vec![AuthServer {
                url: url.to_string(),
                kind,
                users: vec![UserAuth {
                    username: "alice".to_string(),
                    api_token: "tok".to_string(),
                }],
                current_user: None,
            }],
            current_server: None,
        }
    }

    #[test]
    fn test_create_provider_per_kind() {
        let auth = UserAuth {
            username: "alice".to_string(),
            api_token: "tok".to_string(),
        };
        for kind in [
            GitKind::GitHub,
            GitKind::GitLab,
            GitKind::BitBucket,
            GitKind::Gitea,
        ] {
            let provider = create_provider("https://example.com", kind, &auth).unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn test_provider_for_url_uses_configured_server() {
        let config = config_with("https://git.example.com", GitKind::Gitea);
        let (provider, info) =
            provider_for_url(&config, "https://git.example.com/team/app.git").unwrap();
        assert_eq!(provider.kind(), GitKind::Gitea);
        assert_eq!(info.owner, "team");
        assert_eq!(info.name, "app");
    }

    #[test]
    fn test_provider_for_url_unknown_host() {
        let config = AuthConfig::default();
        let err = provider_for_url(&config, "https://git.example.com/a/b").unwrap_err();
        assert!(matches!(err, GitError::UnknownProvider { .. }));
    }

    #[test]
    fn test_provider_for_url_known_host_without_credentials() {
        let config = AuthConfig::default();
        let err = provider_for_url(&config, "https://github.com/a/b").unwrap_err();
        assert!(matches!(err, GitError::Config(_)));
    }
}
