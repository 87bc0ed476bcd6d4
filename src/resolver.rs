//! Repository resolution: make sure a target repository exists before writing.

use crate::github::RepoHost;
use crate::Result;
use tracing::info;

/// How a repository came to be usable for this upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Existing,
    Created,
}

/// Look `repo` up and create it (public, auto-initialised) when GitHub reports
/// it missing. Any other failure is returned untouched; nothing is retried here.
pub async fn ensure_repo_exists(host: &dyn RepoHost, repo: &str) -> Result<RepoStatus> {
    if host.repo_exists(repo).await? {
        return Ok(RepoStatus::Existing);
    }

    host.create_repo(repo).await?;
    info!("Repository {} created successfully", repo);
    Ok(RepoStatus::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockGitHubClient;

    #[tokio::test]
    async fn test_existing_repo_is_not_created() {
        let host = MockGitHubClient::new().with_repo("files");

        let status = ensure_repo_exists(&host, "files").await.unwrap();
        assert_eq!(status, RepoStatus::Existing);
        assert_eq!(host.get_create_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_repo_is_created_once() {
        let host = MockGitHubClient::new();

        let status = ensure_repo_exists(&host, "files").await.unwrap();
        assert_eq!(status, RepoStatus::Created);
        assert_eq!(host.get_created_repos(), vec!["files".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates_without_create() {
        let host = MockGitHubClient::new().with_lookup_failure("files");

        assert!(ensure_repo_exists(&host, "files").await.is_err());
        assert_eq!(host.get_create_count(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let host = MockGitHubClient::new().with_create_failure();

        let err = ensure_repo_exists(&host, "files").await.unwrap_err();
        assert_eq!(err.upstream_message(), "Repository creation failed.");
    }
}
