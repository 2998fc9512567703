//! BitBucket provider
//!
//! Maps the [`crate::git::GitProvider`] operations to the BitBucket
//! Cloud 2.0 API. Authentication uses Basic auth with an app password;
//! the API host is fixed at `api.bitbucket.org` regardless of the
//! configured server URL.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::GitError;
use super::provider::{GitProvider, check_response, http_client};
use super::types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};

const PAGE_LEN: u32 = 100;
const MAX_PAGES: u32 = 10;

/// BitBucket Cloud implementation of [`GitProvider`]
#[derive(Debug)]
pub struct BitBucketProvider {
    client: reqwest::Client,
    api_url: Url,
    server: String,
    username: String,
}

impl BitBucketProvider {
    /// Creates a provider authenticating as `username` with an app password
    ///
    /// # Errors
    ///
    /// Returns an error when the credentials cannot form a header value.
    pub fn new(server: &str, username: &str, app_password: &str) -> Result<Self, GitError> {
        let api_url = Url::parse("https://api.bitbucket.org/2.0/").map_err(|e| {
            GitError::InvalidUrl {
                url: server.to_string(),
                reason: e.to_string(),
            }
        })?;

        let encoded = BASE64.encode(format!("{username}:{app_password}"));
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| GitError::Config(format!("invalid credentials: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(Self {
            client: http_client(headers)?,
            api_url,
            server: server.to_string(),
            username: username.to_string(),
        })
    }

    /// Repository slugs are the lower-cased name with spaces collapsed
    fn slug(name: &str) -> String {
        name.to_lowercase().replace(' ', "-")
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
impl GitProvider for BitBucketProvider {
    fn kind(&self) -> GitKind {
        GitKind::BitBucket
    }

    fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn current_user(&self) -> Result<GitUser, GitError> {
        let user: WireUser = self.get_json("user").await?;
        Ok(user.into())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let repo: WireRepo = self
            .get_json(&format!("repositories/{owner}/{}", Self::slug(name)))
            .await?;
        repo.try_into()
    }

    async fn create_repository(&self, req: &CreateRepository) -> Result<GitRepository, GitError> {
        let workspace = req.owner.as_deref().unwrap_or(&self.username);
        let body = CreateRepoBody {
            scm: "git",
            is_private: req.private,
            description: req.description.as_deref(),
        };
        let repo: WireRepo = self
            .post_json(
                &format!("repositories/{workspace}/{}", Self::slug(&req.name)),
                &body,
            )
            .await?;
        repo.try_into()
    }

    async fn fork_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let repo: WireRepo = self
            .post_json(
                &format!("repositories/{owner}/{}/forks", Self::slug(name)),
                &serde_json::json!({}),
            )
            .await?;
        repo.try_into()
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        req: &CreatePullRequest,
    ) -> Result<PullRequest, GitError> {
        let body = CreatePullBody {
            title: &req.title,
            description: req.body.as_deref(),
            source: BranchRef::new(&req.head),
            destination: BranchRef::new(&req.base),
        };
        let pull: WirePull = self
            .post_json(
                &format!("repositories/{owner}/{}/pullrequests", Self::slug(name)),
                &body,
            )
            .await?;
        Ok(pull.into())
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<GitRepository>, GitError> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let path = format!("repositories/{owner}?pagelen={PAGE_LEN}&page={page}");
            let batch: WirePage = self.get_json(&path).await?;
            for repo in batch.values {
                repos.push(repo.try_into()?);
            }
            if batch.next.is_none() {
                break;
            }
        }
        Ok(repos)
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    username: String,
    display_name: Option<String>,
}

impl From<WireUser> for GitUser {
    fn from(user: WireUser) -> Self {
        Self {
            login: user.username,
            name: user.display_name,
            email: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireLink {
    href: String,
}

#[derive(Debug, Deserialize)]
struct WireCloneLink {
    name: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct WireLinks {
    clone: Vec<WireCloneLink>,
    html: WireLink,
}

#[derive(Debug, Deserialize)]
struct WireRepo {
    slug: String,
    full_name: String,
    is_private: bool,
    links: WireLinks,
    #[serde(default)]
    parent: Option<serde_json::Value>,
    description: Option<String>,
}

impl TryFrom<WireRepo> for GitRepository {
    type Error = GitError;

    fn try_from(repo: WireRepo) -> Result<Self, GitError> {
        let owner = repo
            .full_name
            .rsplit_once('/')
            .map(|(ws, _)| ws.to_string())
            .unwrap_or_default();
        let clone_url = repo
            .links
            .clone
            .iter()
            .find(|l| l.name == "https")
            .map(|l| l.href.clone())
            .ok_or_else(|| GitError::Api {
                status: 200,
                message: format!("repository {} has no https clone link", repo.full_name),
            })?;
        let ssh_url = repo
            .links
            .clone
            .iter()
            .find(|l| l.name == "ssh")
            .map(|l| l.href.clone());
        Ok(Self {
            owner,
            name: repo.slug,
            clone_url,
            html_url: repo.links.html.href,
            ssh_url,
            private: repo.is_private,
            fork: repo.parent.is_some(),
            description: repo.description,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WirePage {
    values: Vec<WireRepo>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    scm: &'a str,
    is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct BranchName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct BranchRef<'a> {
    branch: BranchName<'a>,
}

impl<'a> BranchRef<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            branch: BranchName { name },
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatePullBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    source: BranchRef<'a>,
    destination: BranchRef<'a>,
}

#[derive(Debug, Deserialize)]
struct WirePullLinks {
    html: WireLink,
}

#[derive(Debug, Deserialize)]
struct WirePull {
    id: u64,
    title: String,
    state: String,
    links: WirePullLinks,
}

impl From<WirePull> for PullRequest {
    fn from(pull: WirePull) -> Self {
        Self {
            number: pull.id,
            url: pull.links.html.href,
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
    fn test_slug() {
        assert_eq!(BitBucketProvider::slug("My Repo"), "my-repo");
        assert_eq!(BitBucketProvider::slug("plain"), "plain");
    }

    #[test]
    fn test_repo_mapping() {
        let json = r#"{
            "slug": "jx",
            "full_name": "jx-team/jx",
            "is_private": true,
            "links": {
                "clone": [
                    {"name": "https", "href": "https://bitbucket.org/jx-team/jx.git"},
                    {"name": "ssh", "href": "git@bitbucket.org:jx-team/jx.git"}
                ],
                "html": {"href": "https://bitbucket.org/jx-team/jx"}
            },
            "parent": null,
            "description": ""
        }"#;
        let repo: GitRepository = serde_json::from_str::<WireRepo>(json)
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(repo.owner, "jx-team");
        assert_eq!(repo.clone_url, "https://bitbucket.org/jx-team/jx.git");
        assert!(repo.private);
        assert!(!repo.fork);
    }

    #[test]
    fn test_repo_without_https_link_is_an_error() {
        let json = r#"{
            "slug": "jx",
            "full_name": "jx-team/jx",
            "is_private": false,
            "links": {"clone": [], "html": {"href": "https://bitbucket.org/jx-team/jx"}},
            "description": null
        }"#;
        let result: Result<GitRepository, _> =
            serde_json::from_str::<WireRepo>(json).unwrap().try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_pull_request_body_shape() {
        let body = CreatePullBody {
            title: "promote",
            description: None,
            source: BranchRef::new("promote-x"),
            destination: BranchRef::new("main"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["source"]["branch"]["name"], "promote-x");
        assert_eq!(json["destination"]["branch"]["name"], "main");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_pull_mapping() {
        let json = r#"{
            "id": 3,
            "title": "promote",
            "state": "OPEN",
            "links": {"html": {"href": "https://bitbucket.org/jx-team/jx/pull-requests/3"}}
        }"#;
        let pr: PullRequest = serde_json::from_str::<WirePull>(json).unwrap().into();
        assert_eq!(pr.number, 3);
        assert_eq!(pr.state, "OPEN");
    }
}
