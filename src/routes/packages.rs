//! Package routes
//!
//! Endpoints:
//! - POST /api/upload - Multipart upload, one or more `files` parts
//! - GET /api/files/list - Summaries of all packages, newest first
//! - GET /api/:id - Download a package
//! - DELETE /api/:id - Delete a package

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::package::{Download, FileEntry, ManifestEntry, PackageSummary};
use crate::state::AppState;

/// Multipart field carrying uploaded files
const FILES_FIELD: &str = "files";

const DEFAULT_FILE_NAME: &str = "upload.bin";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    success: bool,
    link: String,
    file_id: String,
    file_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestResponse {
    success: bool,
    file_count: usize,
    files: Vec<ManifestEntry>,
}

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    files: Vec<PackageSummary>,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: &'static str,
}

/// Create the package router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/files/list", get(list))
        .route("/:id", get(download).delete(delete_package))
}

/// POST /api/upload
async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let files = read_files(multipart, state.config()).await?;
    let receipt = state.packages().upload(files).await?;

    Ok(Json(UploadResponse {
        success: true,
        link: share_link(state.config(), &headers, &receipt.id),
        file_id: receipt.id,
        file_count: receipt.file_count,
    }))
}

/// GET /api/:id
async fn download(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    match state.packages().download(&id).await? {
        Download::Single {
            name,
            mime_type,
            content,
        } => {
            let content_type = HeaderValue::from_str(&mime_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, content.len())
                .header(header::CONTENT_DISPOSITION, content_disposition(&name))
                .body(Body::from(content))
                .map_err(|e| AppError::Internal(e.to_string()))
        }
        Download::Manifest { file_count, files } => Ok(Json(ManifestResponse {
            success: true,
            file_count,
            files,
        })
        .into_response()),
    }
}

/// GET /api/files/list
async fn list(State(state): State<AppState>) -> Result<Json<ListResponse>> {
    let files = state.packages().list_all().await?;

    Ok(Json(ListResponse {
        success: true,
        files,
    }))
}

/// DELETE /api/:id
async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.packages().delete_by_id(&id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Package deleted",
    }))
}

/// Collect the `files` parts of a multipart body, in order
async fn read_files(mut multipart: Multipart, config: &Config) -> Result<Vec<FileEntry>> {
    let limits = &config.upload;
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        if files.len() >= limits.max_files {
            return Err(AppError::BadRequest(format!(
                "Too many files (max: {})",
                limits.max_files
            )));
        }

        let name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_guess::from_path(&name).first_or_octet_stream().to_string());

        let mut content = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
        {
            content.extend_from_slice(&chunk);
            if content.len() > limits.max_file_size {
                return Err(AppError::PayloadTooLarge {
                    size: content.len(),
                    max: limits.max_file_size,
                });
            }
        }

        files.push(FileEntry::new(name, mime_type, content));
    }

    Ok(files)
}

/// Build the public download link for a package
fn share_link(config: &Config, headers: &HeaderMap, id: &str) -> String {
    if let Some(base) = &config.public_base_url {
        return format!("{}/api/{}", base, id);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");

    format!("{}://{}/api/{}", scheme, host, id)
}

/// Attachment header with an ASCII fallback and the exact UTF-8 name
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_escapes_name() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );

        let header = content_disposition("na\"me ñ.txt");
        assert!(header.starts_with("attachment; filename=\"na_me _.txt\""));
        assert!(header.ends_with("filename*=UTF-8''na%22me%20%C3%B1.txt"));
        assert!(HeaderValue::from_str(&header).is_ok());
    }

    #[test]
    fn test_share_link_from_headers() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("files.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        assert_eq!(
            share_link(&config, &headers, "1_abc"),
            "https://files.example.com/api/1_abc"
        );
    }

    #[test]
    fn test_share_link_prefers_configured_base() {
        let config = Config {
            public_base_url: Some("https://share.example.org".to_string()),
            ..Config::default()
        };

        assert_eq!(
            share_link(&config, &HeaderMap::new(), "1_abc"),
            "https://share.example.org/api/1_abc"
        );
    }
}
