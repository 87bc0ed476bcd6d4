//! HTTP surface: upload and health endpoints plus static files.

use crate::github::{GitHubClient, MockGitHubClient, RepoHost};
use crate::models::{ClientError, Config, HealthResponse, UploadFailure, UploadResponse};
use crate::uploader::{UploadTarget, Uploader};
use crate::{Error, Result};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "GitHub File Upload";
const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub uploader: Arc<Uploader>,
}

impl AppState {
    pub fn new(uploader: Uploader) -> Self {
        Self {
            uploader: Arc::new(uploader),
        }
    }
}

/// Build the uploader for `config`, against GitHub or, in dry-run mode, an
/// in-memory backend.
pub fn build_uploader(config: &Config) -> Result<Uploader> {
    let host: Box<dyn RepoHost> = if config.dry_run {
        info!("DRY_RUN enabled - files are kept in memory, nothing reaches GitHub");
        Box::new(MockGitHubClient::discarding())
    } else {
        Box::new(GitHubClient::new(
            config.github_token.clone(),
            config.owner.clone(),
            config.api_url.clone(),
        )?)
    };

    Uploader::new(host, UploadTarget::from(config))
}

pub fn routes(state: AppState, static_dir: &str, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/upload", post(upload))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let uploader = build_uploader(&config)?;
    info!(
        "Uploading to {} with pool [{}] on branch {}",
        config.owner,
        config.repos.join(", "),
        config.branch
    );

    let app = routes(
        AppState::new(uploader),
        &config.static_dir,
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on port {}", config.port);
    info!("Visit: http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let request_id = Uuid::new_v4();

    // Anything that is not a multipart body simply carries no file.
    let Ok(mut multipart) = multipart else {
        return Err(Error::NoFile);
    };

    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        file = Some((original_name, data));
        break;
    }

    let (original_name, data) = match file {
        Some((name, data)) if !data.is_empty() => (name, data),
        _ => return Err(Error::NoFile),
    };

    info!(
        %request_id,
        "Uploading file: {}, Size: {} bytes",
        original_name.as_deref().unwrap_or("<unnamed>"),
        data.len()
    );

    let stored = state.uploader.upload_file(&data).await?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        filename: original_name
            .filter(|name| !name.is_empty())
            .unwrap_or(stored.file_name),
        size: data.len(),
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NoFile | Error::EmptyUpload => (
                StatusCode::BAD_REQUEST,
                Json(ClientError {
                    error: Error::NoFile.to_string(),
                }),
            )
                .into_response(),
            Error::Multipart(e) => (
                e.status(),
                Json(UploadFailure {
                    success: false,
                    error: e.body_text(),
                }),
            )
                .into_response(),
            other => {
                error!("Server error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(UploadFailure {
                        success: false,
                        error: other.upstream_message(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_MAX_UPLOAD_BYTES;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn test_server(host: &MockGitHubClient) -> TestServer {
        let uploader = Uploader::new(
            Box::new(host.clone()),
            UploadTarget {
                owner: "octocat".to_string(),
                branch: "main".to_string(),
                repos: vec!["files".to_string()],
                raw_url: "https://raw.githubusercontent.com".to_string(),
            },
        )
        .unwrap();
        let app = routes(
            AppState::new(uploader),
            "does-not-exist",
            DEFAULT_MAX_UPLOAD_BYTES,
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_dry_run_uploader_accepts_uploads() {
        let config = Config::from_lookup(|key| match key {
            "GITHUB_TOKEN" => Some("unused".to_string()),
            "GITHUB_OWNER" => Some("octocat".to_string()),
            "GITHUB_REPOS" => Some("files".to_string()),
            "DRY_RUN" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();

        let uploader = build_uploader(&config).unwrap();
        let stored = uploader.upload_file(b"%PDF-1.4").await.unwrap();

        assert!(stored.url.starts_with(
            "https://raw.githubusercontent.com/octocat/files/main/uploads/"
        ));
        assert!(stored.url.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_resolution_and_write_failures_share_message_shape() {
        let unresolvable = MockGitHubClient::new().with_create_failure();
        let response = test_server(&unresolvable)
            .post("/api/upload")
            .multipart(MultipartForm::new().add_part("file", Part::bytes(b"data".to_vec())))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&serde_json::json!({
            "success": false,
            "error": "Repository creation failed."
        }));

        let unwritable = MockGitHubClient::new()
            .with_repo("files")
            .with_put_failure(crate::UpstreamError::new(409, Some("Conflict".to_string())));
        let response = test_server(&unwritable)
            .post("/api/upload")
            .multipart(MultipartForm::new().add_part("file", Part::bytes(b"data".to_vec())))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&serde_json::json!({
            "success": false,
            "error": "Failed to upload file: Conflict"
        }));
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let server = test_server(&MockGitHubClient::new());

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body: HealthResponse = response.json();
        assert_eq!(body.status, "OK");
        assert_eq!(body.service, SERVICE_NAME);
        assert!(chrono::DateTime::parse_from_rfc3339(&body.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body_is_400() {
        let host = MockGitHubClient::new();
        let server = test_server(&host);

        let response = server.post("/api/upload").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&serde_json::json!({"error": "No file uploaded"}));
        assert_eq!(host.get_lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_with_empty_file_is_400() {
        let host = MockGitHubClient::new().with_repo("files");
        let server = test_server(&host);

        let form = MultipartForm::new()
            .add_part("file", Part::bytes(Vec::<u8>::new()).file_name("empty.txt"));
        let response = server.post("/api/upload").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(host.get_lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_stored_name() {
        let host = MockGitHubClient::new().with_repo("files");
        let server = test_server(&host);

        let form = MultipartForm::new().add_part("file", Part::bytes(b"%PDF-1.4".to_vec()));
        let response = server.post("/api/upload").multipart(form).await;

        response.assert_status_ok();
        let body: UploadResponse = response.json();
        assert!(body.filename.ends_with(".pdf"));
        assert!(body.url.ends_with(&body.filename));
    }
}
