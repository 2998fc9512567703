//! GitLab provider
//!
//! Maps the [`crate::git::GitProvider`] operations to the GitLab REST
//! API v4. Projects are addressed by their URL-encoded
//! `namespace/path` id, so nested group paths work unchanged.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::GitError;
use super::provider::{GitProvider, check_response, http_client};
use super::types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};

const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 10;

/// GitLab implementation of [`GitProvider`]
#[derive(Debug)]
pub struct GitLabProvider {
    client: reqwest::Client,
    api_url: Url,
    server: String,
}

impl GitLabProvider {
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
            .join("api/v4/")
            .map_err(|e| GitError::InvalidUrl {
                url: server.to_string(),
                reason: e.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(token)
            .map_err(|e| GitError::Config(format!("invalid API token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(HeaderName::from_static("private-token"), auth);

        Ok(Self {
            client: http_client(headers)?,
            api_url,
            server: server.to_string(),
        })
    }

    /// URL-encoded project id for the `owner/name` pair
    fn project_id(owner: &str, name: &str) -> String {
        format!("{}%2F{}", owner.replace('/', "%2F"), name)
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

    /// Resolves a namespace (group or user) path to its numeric id
    async fn namespace_id(&self, path: &str) -> Result<u64, GitError> {
        let namespaces: Vec<WireNamespace> = self
            .get_json(&format!("namespaces?search={path}"))
            .await?;
        namespaces
            .into_iter()
            .find(|n| n.full_path == path)
            .map(|n| n.id)
            .ok_or_else(|| GitError::NotFound {
                what: format!("namespace {path}"),
            })
    }
}

#[async_trait]
impl GitProvider for GitLabProvider {
    fn kind(&self) -> GitKind {
        GitKind::GitLab
    }

    fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn current_user(&self) -> Result<GitUser, GitError> {
        let user: WireUser = self.get_json("user").await?;
        Ok(user.into())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let project: WireProject = self
            .get_json(&format!("projects/{}", Self::project_id(owner, name)))
            .await?;
        Ok(project.into())
    }

    async fn create_repository(&self, req: &CreateRepository) -> Result<GitRepository, GitError> {
        let namespace_id = match &req.owner {
            Some(owner) => Some(self.namespace_id(owner).await?),
            None => None,
        };
        let body = CreateProjectBody {
            name: &req.name,
            description: req.description.as_deref(),
            visibility: if req.private { "private" } else { "public" },
            namespace_id,
        };
        let project: WireProject = self.post_json("projects", &body).await?;
        Ok(project.into())
    }

    async fn fork_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError> {
        let project: WireProject = self
            .post_json(
                &format!("projects/{}/fork", Self::project_id(owner, name)),
                &serde_json::json!({}),
            )
            .await?;
        Ok(project.into())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        req: &CreatePullRequest,
    ) -> Result<PullRequest, GitError> {
        let body = CreateMergeRequestBody {
            title: &req.title,
            description: req.body.as_deref(),
            source_branch: &req.head,
            target_branch: &req.base,
        };
        let mr: WireMergeRequest = self
            .post_json(
                &format!("projects/{}/merge_requests", Self::project_id(owner, name)),
                &body,
            )
            .await?;
        Ok(mr.into())
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<GitRepository>, GitError> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let path = format!("users/{owner}/projects?per_page={PER_PAGE}&page={page}");
            let batch: Vec<WireProject> = self.get_json(&path).await?;
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
    username: String,
    name: Option<String>,
    email: Option<String>,
}

impl From<WireUser> for GitUser {
    fn from(user: WireUser) -> Self {
        Self {
            login: user.username,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireNamespace {
    id: u64,
    full_path: String,
}

#[derive(Debug, Deserialize)]
struct WireProject {
    path: String,
    path_with_namespace: String,
    http_url_to_repo: String,
    web_url: String,
    ssh_url_to_repo: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    forked_from_project: Option<serde_json::Value>,
    description: Option<String>,
}

impl From<WireProject> for GitRepository {
    fn from(project: WireProject) -> Self {
        let owner = project
            .path_with_namespace
            .rsplit_once('/')
            .map(|(ns, _)| ns.to_string())
            .unwrap_or_default();
        Self {
            owner,
            name: project.path,
            clone_url: project.http_url_to_repo,
            html_url: project.web_url,
            ssh_url: project.ssh_url_to_repo,
            private: project.visibility.as_deref() != Some("public"),
            fork: project.forked_from_project.is_some(),
            description: project.description,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    visibility: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CreateMergeRequestBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    source_branch: &'a str,
    target_branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireMergeRequest {
    iid: u64,
    web_url: String,
    title: String,
    state: String,
}

impl From<WireMergeRequest> for PullRequest {
    fn from(mr: WireMergeRequest) -> Self {
        Self {
            number: mr.iid,
            url: mr.web_url,
            title: mr.title,
            state: mr.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_url() {
        let provider = GitLabProvider::new("https://gitlab.example.com", "t").unwrap();
        assert_eq!(
            provider.api_url().as_str(),
            "https://gitlab.example.com/api/v4/"
        );
    }

    #[test]
    fn test_project_id_encodes_nested_groups() {
        assert_eq!(GitLabProvider::project_id("group", "proj"), "group%2Fproj");
        assert_eq!(
            GitLabProvider::project_id("group/sub", "proj"),
            "group%2Fsub%2Fproj"
        );
    }

    #[test]
    fn test_project_mapping() {
        let json = r#"{
            "path": "project",
            "path_with_namespace": "group/sub/project",
            "http_url_to_repo": "https://gitlab.com/group/sub/project.git",
            "web_url": "https://gitlab.com/group/sub/project",
            "ssh_url_to_repo": "git@gitlab.com:group/sub/project.git",
            "visibility": "public",
            "forked_from_project": {"id": 1},
            "description": null
        }"#;
        let repo: GitRepository = serde_json::from_str::<WireProject>(json).unwrap().into();
        assert_eq!(repo.owner, "group/sub");
        assert_eq!(repo.name, "project");
        assert!(!repo.private);
        assert!(repo.fork);
    }

    #[test]
    fn test_private_when_visibility_missing() {
        let json = r#"{
            "path": "p",
            "path_with_namespace": "o/p",
            "http_url_to_repo": "https://gitlab.com/o/p.git",
            "web_url": "https://gitlab.com/o/p",
            "ssh_url_to_repo": null,
            "description": null
        }"#;
        let repo: GitRepository = serde_json::from_str::<WireProject>(json).unwrap().into();
        assert!(repo.private);
    }

    #[test]
    fn test_merge_request_mapping() {
        let json = r#"{
            "iid": 12,
            "web_url": "https://gitlab.com/o/p/-/merge_requests/12",
            "title": "chore: promote",
            "state": "opened"
        }"#;
        let pr: PullRequest = serde_json::from_str::<WireMergeRequest>(json).unwrap().into();
        assert_eq!(pr.number, 12);
        assert_eq!(pr.state, "opened");
    }
}
