//! Gitea provider
//!
//! Maps the [`crate::git::GitProvider`] operations to the Gitea API v1,
//! which follows the GitHub API shapes closely.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::GitError;
use super::provider::{GitProvider, check_response, http_client};
use super::types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};

const PER_PAGE: u32 = 50;
const MAX_PAGES: u32 = 10;

/// Gitea implementation of [`GitProvider`]
#[derive(Debug)]
pub struct GiteaProvider {
    client: reqwest::Client,
    api_url: Url,
    server: String,
}

impl GiteaProvider {
    /// Creates a provider for the given server URL and API token
    ///
    /// # Errors
    ///
    /// Returns an error when the server URL cannot be parsed or the
    /// token is not a valid header value.
    pub fn new(server: &str, token: &str) -> Result<Self, GitError> {
        let server_url = Url::parse(server).map_err(|e| GitError::InvalidUrl {
            url: server.to_string(),
            reason: e.to_string(),
        })?;
        let api_url = server_url
            .join("api/v1/")
            .map_err(|e| GitError::InvalidUrl {
                url: server.to_string(),
                reason: e.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|e| GitError::Config(format!("invalid API token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(Self {
            client: http_client(headers)?,
            api_url,
            server: server.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GitError> {
        self.api_url.join(path).map_err(|e| GitError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GitError> {
        let resp = self.client.get(self.endpoint(path)?).send().await?;
        Ok(check_response(&self.server, resp).await?.json().await?)
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitError> {
        let resp = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Ok(check_response(&self.server, resp).await?.json().await?)
    }
}

#[async_trait]
impl GitProvider for GiteaProvider {
    fn kind(&self) -> GitKind {
        GitKind::Gitea
    }

    fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn current_user(&self) -> Result<GitUser, GitError> {
        let user: WireUser = self.get_json("user").await?;
        Ok(user.into())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let repo: WireRepo = self.get_json(&format!("repos/{owner}/{name}")).await?;
        Ok(repo.into())
    }

    async fn create_repository(&self, req: &CreateRepository) -> Result<GitRepository, GitError> {
        let path = match &req.owner {
            Some(org) => format!("orgs/{org}/repos"),
            None => "user/repos".to_string(),
        };
        let body = CreateRepoBody {
            name: &req.name,
            description: req.description.as_deref(),
            private: req.private,
        };
        let repo: WireRepo = self.post_json(&path, &body).await?;
        Ok(repo.into())
    }

    async fn fork_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let repo: WireRepo = self
            .post_json(&format!("repos/{owner}/{name}/forks"), &serde_json::json!({}))
            .await?;
        Ok(repo.into())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        req: &CreatePullRequest,
    ) -> Result<PullRequest, GitError> {
        let body = CreatePullBody {
            title: &req.title,
            body: req.body.as_deref(),
            head: &req.head,
            base: &req.base,
        };
        let pull: WirePull = self
            .post_json(&format!("repos/{owner}/{name}/pulls"), &body)
            .await?;
        Ok(pull.into())
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<GitRepository>, GitError> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let path = format!("users/{owner}/repos?limit={PER_PAGE}&page={page}");
            let batch: Vec<WireRepo> = self.get_json(&path).await?;
            let len = batch.len();
            repos.extend(batch.into_iter().map(GitRepository::from));
            if len < PER_PAGE as usize {
                break;
            }
        }
        Ok(repos)
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
    full_name: Option<String>,
    email: Option<String>,
}

impl From<WireUser> for GitUser {
    fn from(user: WireUser) -> Self {
        Self {
            login: user.login,
            name: user.full_name.filter(|n| !n.is_empty()),
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireRepo {
    name: String,
    owner: WireOwner,
    clone_url: String,
    html_url: String,
    ssh_url: Option<String>,
    private: bool,
    #[serde(default)]
    fork: bool,
    description: Option<String>,
}

impl From<WireRepo> for GitRepository {
    fn from(repo: WireRepo) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
            clone_url: repo.clone_url,
            html_url: repo.html_url,
            ssh_url: repo.ssh_url,
            private: repo.private,
            fork: repo.fork,
            description: repo.description.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    private: bool,
}

#[derive(Debug, Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct WirePull {
    number: u64,
    html_url: String,
    title: String,
    state: String,
}

impl From<WirePull> for PullRequest {
    fn from(pull: WirePull) -> Self {
        Self {
            number: pull.number,
            url: pull.html_url,
            title: pull.title,
            state: pull.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_url() {
        let provider = GiteaProvider::new("https://gitea.example.com", "t").unwrap();
        assert_eq!(
            provider.api_url().as_str(),
            "https://gitea.example.com/api/v1/"
        );
    }

    #[test]
    fn test_user_mapping_empty_full_name() {
        let json = r#"{"login": "dan", "full_name": "", "email": "dan@example.com"}"#;
        let user: GitUser = serde_json::from_str::<WireUser>(json).unwrap().into();
        assert_eq!(user.login, "dan");
        assert_eq!(user.name, None);
        assert_eq!(user.email.as_deref(), Some("dan@example.com"));
    }

    #[test]
    fn test_repo_mapping() {
        let json = r#"{
            "name": "demo",
            "owner": {"login": "dan"},
            "clone_url": "https://gitea.example.com/dan/demo.git",
            "html_url": "https://gitea.example.com/dan/demo",
            "ssh_url": "git@gitea.example.com:dan/demo.git",
            "private": false,
            "fork": false,
            "description": ""
        }"#;
        let repo: GitRepository = serde_json::from_str::<WireRepo>(json).unwrap().into();
        assert_eq!(repo.full_name(), "dan/demo");
        assert_eq!(repo.description, None);
    }
}
