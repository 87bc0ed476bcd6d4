//! HTTP relay that stores uploaded files in GitHub repositories
//!
//! Accepts multipart uploads, commits each file to a repository picked from a
//! configured pool (creating repositories on demand), and hands back the
//! raw.githubusercontent.com URL of the stored content.

pub mod error;
pub mod github;
pub mod mime;
pub mod models;
pub mod naming;
pub mod resolver;
pub mod server;
pub mod uploader;

pub use error::{Error, Result, UpstreamError};
