//! GitHub integration for storing uploaded files
//!
//! Wraps the three REST calls the relay needs: repository lookup, repository
//! creation, and the contents API write.

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockGitHubClient;

use crate::models::PutContentRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RepoHost: Send + Sync {
    /// `Ok(false)` only for a definite "not found"; every other failure is an error.
    async fn repo_exists(&self, repo: &str) -> Result<bool>;
    async fn create_repo(&self, repo: &str) -> Result<()>;
    async fn put_file(&self, repo: &str, path: &str, request: &PutContentRequest) -> Result<()>;
}
