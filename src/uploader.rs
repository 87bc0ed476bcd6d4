//! Content upload: sniff, name, resolve a repository, and commit the file.

use crate::github::RepoHost;
use crate::mime;
use crate::models::{Config, PutContentRequest};
use crate::naming;
use crate::resolver::{ensure_repo_exists, RepoStatus};
use crate::{Error, Result};
use base64::Engine as _;
use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::{error, info, warn};

/// Where uploads go. Read-only once the server is running.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub owner: String,
    pub branch: String,
    pub repos: Vec<String>,
    pub raw_url: String,
}

impl From<&Config> for UploadTarget {
    fn from(config: &Config) -> Self {
        Self {
            owner: config.owner.clone(),
            branch: config.branch.clone(),
            repos: config.repos.clone(),
            raw_url: config.raw_url.clone(),
        }
    }
}

/// A file committed to GitHub.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub url: String,
    pub repo: String,
    pub path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepoChoice {
    /// Uniform pick from the configured pool.
    Pool,
    /// Brand-new `dat-xxxxxx` repository.
    Generated,
}

/// Tried in order; the first repository that resolves wins.
const RESOLUTION_ORDER: [RepoChoice; 2] = [RepoChoice::Pool, RepoChoice::Generated];

pub struct Uploader {
    host: Box<dyn RepoHost>,
    target: UploadTarget,
}

impl Uploader {
    pub fn new(host: Box<dyn RepoHost>, target: UploadTarget) -> Result<Self> {
        if target.repos.is_empty() {
            return Err(Error::Config(
                "repository pool must contain at least one repository".to_string(),
            ));
        }
        Ok(Self { host, target })
    }

    /// Public raw-content URL for `path` in `repo` on the configured branch.
    pub fn raw_url(&self, repo: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.target.raw_url, self.target.owner, repo, self.target.branch, path
        )
    }

    /// Store `data` as a new file and return where it can be fetched.
    ///
    /// At most two repository resolutions and exactly one content write are
    /// attempted. Nothing is rolled back on failure.
    pub async fn upload_file(&self, data: &[u8]) -> Result<StoredUpload> {
        if data.is_empty() {
            return Err(Error::EmptyUpload);
        }

        let ext = mime::extension_for(data);
        let file_name = naming::stored_file_name(ext, Utc::now().timestamp_millis());
        let path = naming::upload_path(&file_name);
        let content = base64::engine::general_purpose::STANDARD.encode(data);

        let (repo, status) = self.resolve_target().await?;

        let request = PutContentRequest {
            message: format!("Upload file {}", file_name),
            content,
            branch: self.target.branch.clone(),
        };

        if let Err(e) = self.host.put_file(&repo, &path, &request).await {
            error!("Upload error: {}", e);
            if status == RepoStatus::Created {
                warn!(
                    "Repository {} was created for this upload and is left without content",
                    repo
                );
            }
            return Err(Error::Upload(e.upstream_message()));
        }

        let url = self.raw_url(&repo, &path);
        info!("Stored {} bytes at {}", data.len(), url);

        Ok(StoredUpload {
            url,
            repo,
            path,
            file_name,
        })
    }

    async fn resolve_target(&self) -> Result<(String, RepoStatus)> {
        let mut last_error = None;

        for choice in RESOLUTION_ORDER {
            let repo = self.candidate(choice)?;
            match ensure_repo_exists(self.host.as_ref(), &repo).await {
                Ok(status) => {
                    info!("Using repository {} ({:?}, {:?})", repo, choice, status);
                    return Ok((repo, status));
                }
                Err(e) => {
                    warn!("Could not resolve repository {}: {}", repo, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::Config("no repository resolution strategy".to_string())))
    }

    fn candidate(&self, choice: RepoChoice) -> Result<String> {
        match choice {
            RepoChoice::Pool => self
                .target
                .repos
                .choose(&mut rand::thread_rng())
                .cloned()
                .ok_or_else(|| Error::Config("repository pool is empty".to_string())),
            RepoChoice::Generated => Ok(naming::generate_repo_name()),
        }
    }
}
