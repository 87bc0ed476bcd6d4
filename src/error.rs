//! Error handling and custom error types
//!
//! Provides unified error handling across the relay using thiserror.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Failed to upload file: {0}")]
    Upload(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("No file uploaded")]
    NoFile,

    #[error("Uploaded file is empty")]
    EmptyUpload,
}

impl Error {
    /// Message reported by the GitHub API when it sent one, otherwise the
    /// transport-level description of the failure.
    pub fn upstream_message(&self) -> String {
        match self {
            Error::Upstream(upstream) => upstream
                .message
                .clone()
                .unwrap_or_else(|| upstream.to_string()),
            other => other.to_string(),
        }
    }
}

/// Non-2xx answer from the GitHub API.
///
/// `message` is the `message` field of the JSON error body, when the body had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub status: u16,
    pub message: Option<String>,
}

impl UpstreamError {
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "GitHub API error (status {}): {}", self.status, message),
            None => write!(f, "Request failed with status code {}", self.status),
        }
    }
}

impl std::error::Error for UpstreamError {}

pub type Result<T> = std::result::Result<T, Error>;
