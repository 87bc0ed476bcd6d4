use super::RepoHost;
use crate::models::{CreateRepoRequest, GitHubErrorBody, PutContentRequest};
use crate::{Error, Result, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

pub const USER_AGENT: &str = concat!("github-upload-relay/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    token: String,
    owner: String,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: String, owner: String, base_url: String) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::new_with_client(token, owner, base_url, client))
    }

    pub fn new_with_client(token: String, owner: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            token,
            owner,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn repo_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, self.owner, repo)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn send(&self, builder: reqwest::RequestBuilder, action: &str) -> Result<Response> {
        builder.send().await.map_err(|e| {
            tracing::error!("Failed to send {} request to GitHub: {}", action, e);
            Error::Http(e)
        })
    }
}

/// Turn a non-2xx response into a typed error, keeping the API's `message`.
async fn upstream_error(response: Response, action: &str) -> Error {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Error::Http(e),
    };
    tracing::error!("GitHub {} error (status {}): {}", action, status, body);

    let message = serde_json::from_str::<GitHubErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message);
    Error::Upstream(UpstreamError::new(status.as_u16(), message))
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn repo_exists(&self, repo: &str) -> Result<bool> {
        tracing::debug!("Checking repository {}/{}", self.owner, repo);

        let response = self
            .send(
                self.request(reqwest::Method::GET, &self.repo_url(repo)),
                "repository lookup",
            )
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(upstream_error(response, "repository lookup").await),
        }
    }

    async fn create_repo(&self, repo: &str) -> Result<()> {
        tracing::debug!("Creating repository {}", repo);

        let url = format!("{}/user/repos", self.base_url);
        let response = self
            .send(
                self.request(reqwest::Method::POST, &url)
                    .json(&CreateRepoRequest::public(repo)),
                "repository creation",
            )
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, "repository creation").await);
        }
        Ok(())
    }

    async fn put_file(&self, repo: &str, path: &str, request: &PutContentRequest) -> Result<()> {
        tracing::debug!("Writing {} to {}/{}", path, self.owner, repo);

        let url = format!("{}/contents/{}", self.repo_url(repo), path);
        let response = self
            .send(
                self.request(reqwest::Method::PUT, &url).json(request),
                "contents write",
            )
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response, "contents write").await);
        }
        Ok(())
    }
}
