use super::RepoHost;
use crate::models::PutContentRequest;
use crate::{Error, Result, UpstreamError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the GitHub API.
///
/// Clones share state, so a test can keep a handle after giving the client away.
#[derive(Clone, Default)]
pub struct MockGitHubClient {
    repos: Arc<Mutex<HashSet<String>>>,
    files: Arc<Mutex<HashMap<String, PutContentRequest>>>,
    discard_content: bool,
    created: Arc<Mutex<Vec<String>>>,
    failing_lookups: Arc<Mutex<HashSet<String>>>,
    fail_creates: Arc<Mutex<bool>>,
    put_failure: Arc<Mutex<Option<UpstreamError>>>,
    lookup_count: Arc<Mutex<usize>>,
    create_count: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts writes without keeping them. Memory stays flat no matter how
    /// many files pass through, which is what a long-running dry run needs.
    pub fn discarding() -> Self {
        Self {
            discard_content: true,
            ..Self::default()
        }
    }

    pub fn with_repo(self, repo: &str) -> Self {
        self.repos.lock().unwrap().insert(repo.to_string());
        self
    }

    /// Lookups of `repo` fail with a 500 instead of answering.
    pub fn with_lookup_failure(self, repo: &str) -> Self {
        self.failing_lookups.lock().unwrap().insert(repo.to_string());
        self
    }

    /// Every repository creation is rejected with a 422.
    pub fn with_create_failure(self) -> Self {
        *self.fail_creates.lock().unwrap() = true;
        self
    }

    pub fn with_put_failure(self, failure: UpstreamError) -> Self {
        *self.put_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn get_lookup_count(&self) -> usize {
        *self.lookup_count.lock().unwrap()
    }

    pub fn get_create_count(&self) -> usize {
        *self.create_count.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    /// Repositories created through this client, in creation order.
    pub fn get_created_repos(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Stored writes keyed by `<repo>/<path>`.
    pub fn get_files(&self) -> HashMap<String, PutContentRequest> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoHost for MockGitHubClient {
    async fn repo_exists(&self, repo: &str) -> Result<bool> {
        *self.lookup_count.lock().unwrap() += 1;

        if self.failing_lookups.lock().unwrap().contains(repo) {
            return Err(Error::Upstream(UpstreamError::new(
                500,
                Some("Server Error".to_string()),
            )));
        }
        Ok(self.repos.lock().unwrap().contains(repo))
    }

    async fn create_repo(&self, repo: &str) -> Result<()> {
        *self.create_count.lock().unwrap() += 1;

        if *self.fail_creates.lock().unwrap() {
            return Err(Error::Upstream(UpstreamError::new(
                422,
                Some("Repository creation failed.".to_string()),
            )));
        }

        let mut repos = self.repos.lock().unwrap();
        if !repos.insert(repo.to_string()) {
            return Err(Error::Upstream(UpstreamError::new(
                422,
                Some("name already exists on this account".to_string()),
            )));
        }
        self.created.lock().unwrap().push(repo.to_string());
        Ok(())
    }

    async fn put_file(&self, repo: &str, path: &str, request: &PutContentRequest) -> Result<()> {
        *self.put_count.lock().unwrap() += 1;

        if let Some(failure) = self.put_failure.lock().unwrap().clone() {
            return Err(Error::Upstream(failure));
        }
        if !self.repos.lock().unwrap().contains(repo) {
            return Err(Error::Upstream(UpstreamError::new(
                404,
                Some("Not Found".to_string()),
            )));
        }

        if self.discard_content {
            tracing::debug!(
                "Dry run: discarded {} base64 bytes for {}/{}",
                request.content.len(),
                repo,
                path
            );
            return Ok(());
        }

        let key = format!("{}/{}", repo, path);
        let mut files = self.files.lock().unwrap();
        if files.contains_key(&key) {
            return Err(Error::Upstream(UpstreamError::new(
                422,
                Some("Invalid request.\n\n\"sha\" wasn't supplied.".to_string()),
            )));
        }
        files.insert(key, request.clone());
        Ok(())
    }
}
