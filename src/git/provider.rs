//! Git provider trait
//!
//! One async trait over the REST APIs of the supported git hosting
//! services. Implementations map their wire formats into the
//! provider-neutral types in [`crate::git::types`].

use async_trait::async_trait;
use reqwest::Response;
use reqwest::header::HeaderMap;
use url::Url;

use super::errors::GitError;
use super::types::{
    CreatePullRequest, CreateRepository, GitKind, GitRepository, GitUser, PullRequest,
};

/// Maximum length of an API error body carried into an error message
const MAX_ERROR_BODY: usize = 300;

/// Operations every git hosting provider supports
#[async_trait]
pub trait GitProvider: Send + Sync + std::fmt::Debug {
    /// Kind of this provider
    fn kind(&self) -> GitKind;

    /// Base URL of the provider's REST API
    fn api_url(&self) -> &Url;

    /// Returns the user the API token authenticates as
    async fn current_user(&self) -> Result<GitUser, GitError>;

    /// Fetches a repository by owner and name
    async fn get_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError>;

    /// Creates a repository for the authenticated user or an organization
    async fn create_repository(&self, req: &CreateRepository) -> Result<GitRepository, GitError>;

    /// Forks a repository into the authenticated user's namespace
    ///
    /// Providers return the existing fork when one is already present;
    /// callers see both cases as success.
    async fn fork_repository(&self, owner: &str, name: &str) -> Result<GitRepository, GitError>;

    /// Opens a pull request against the given repository
    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        req: &CreatePullRequest,
    ) -> Result<PullRequest, GitError>;

    /// Lists repositories owned by the given user or organization
    async fn list_repositories(&self, owner: &str) -> Result<Vec<GitRepository>, GitError>;
}

/// Builds the HTTP client shared by a provider's requests
pub(crate) fn http_client(headers: HeaderMap) -> Result<reqwest::Client, GitError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("jx/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()?)
}

/// Maps non-success responses into typed errors
///
/// 401/403 become [`GitError::Auth`], 404 becomes [`GitError::NotFound`],
/// anything else carries the (truncated) response body.
pub(crate) async fn check_response(server: &str, resp: Response) -> Result<Response, GitError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status.as_u16() {
        401 | 403 => Err(GitError::Auth {
            server: server.to_string(),
        }),
        404 => Err(GitError::NotFound {
            what: resp.url().path().to_string(),
        }),
        code => {
            let mut message = resp.text().await.unwrap_or_else(|_| status.to_string());
            if message.len() > MAX_ERROR_BODY {
                message.truncate(MAX_ERROR_BODY);
                message.push_str("...");
            }
            Err(GitError::Api {
                status: code,
                message,
            })
        }
    }
}
