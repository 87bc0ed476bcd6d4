//! Data models and structures
//!
//! Defines the relay configuration, the GitHub REST payloads, and the JSON
//! bodies returned by the relay's own API.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

// GitHub API Request/Response models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateRepoRequest {
    pub name: String,
    pub private: bool,
    pub auto_init: bool,
}

impl CreateRepoRequest {
    /// Public repository with an initial commit, so the default branch exists
    /// before the first content write.
    pub fn public(name: &str) -> Self {
        Self {
            name: name.to_string(),
            private: false,
            auto_init: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PutContentRequest {
    pub message: String,
    /// Base64 encoded file body.
    pub content: String,
    pub branch: String,
}

/// Error body returned by the GitHub API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct GitHubErrorBody {
    pub message: Option<String>,
}

// Relay API response models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadFailure {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientError {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub owner: String,
    pub branch: String,
    pub repos: Vec<String>,
    pub api_url: String,
    pub raw_url: String,
    pub port: u16,
    pub static_dir: String,
    pub max_upload_bytes: usize,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        let repos = parse_repo_pool(&required("GITHUB_REPOS")?);
        if repos.is_empty() {
            return Err(crate::Error::Config(
                "GITHUB_REPOS must name at least one repository".to_string(),
            ));
        }

        let port = match optional("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid PORT '{}'", value)))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match optional("MAX_UPLOAD_BYTES") {
            Some(value) => value.trim().parse().map_err(|_| {
                crate::Error::Config(format!("Invalid MAX_UPLOAD_BYTES '{}'", value))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let dry_run = optional("DRY_RUN")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            github_token: required("GITHUB_TOKEN")?,
            owner: required("GITHUB_OWNER")?,
            branch: optional("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            repos,
            api_url: optional("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            raw_url: optional("GITHUB_RAW_URL")
                .unwrap_or_else(|| DEFAULT_RAW_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            port,
            static_dir: optional("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            max_upload_bytes,
            dry_run,
        })
    }
}

fn parse_repo_pool(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
