//! Versioned file handlers

use crate::state::{AppState, ServerEvent};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use quire_core::error::{ErrorKind, QuireError};
use quire_core::remote::{decode_content, encode_content, RemoteContentStore, VersionToken};
use serde::{Deserialize, Serialize};

type ApiError = (StatusCode, String);

/// A stored file
#[derive(Debug, Serialize)]
pub struct ContentsResponse {
    pub path: String,
    pub sha: String,
    pub encoding: &'static str,
    pub content: String,
}

/// Body of a create or replace request
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub message: String,

    /// Base64-encoded file content
    pub content: String,

    /// Token of the version being replaced; absent when creating
    #[serde(default)]
    pub sha: Option<String>,

    /// Accepted for client compatibility; there is a single branch
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub content: WrittenFile,
}

#[derive(Debug, Serialize)]
pub struct WrittenFile {
    pub path: String,
    pub sha: String,
}

/// Normalize a requested path, rejecting empty and relative segments
fn validate_path(path: &str) -> Result<String, ApiError> {
    let trimmed = path.trim_matches('/');
    let valid = !trimmed.is_empty()
        && trimmed
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err((StatusCode::BAD_REQUEST, format!("Invalid path: {}", path)))
    }
}

fn api_error(e: QuireError) -> ApiError {
    let status = match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", e);
    }
    (status, e.to_string())
}

/// Read a file
pub async fn get_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ContentsResponse>, ApiError> {
    let path = validate_path(&path)?;
    let file = state
        .store
        .read_file(&path)
        .await
        .map_err(api_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No such file: {}", path)))?;

    Ok(Json(ContentsResponse {
        sha: file.token.to_string(),
        encoding: "base64",
        content: encode_content(&file.content),
        path,
    }))
}

/// Create or replace a file
///
/// Creating requires that no `sha` is sent; replacing requires the `sha` of
/// the current version. Anything else is a conflict.
pub async fn put_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(request): Json<WriteRequest>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let path = validate_path(&path)?;
    let data = decode_content(&request.content).map_err(api_error)?;
    let expected = request.sha.map(VersionToken::new);

    let token = state
        .store
        .write_file(&path, data, &request.message, expected.as_ref())
        .await
        .map_err(api_error)?;

    tracing::info!(path = %path, sha = %token, "{}", request.message);
    state.broadcast(ServerEvent::FileUpdated {
        path: path.clone(),
        sha: token.to_string(),
    });

    let status = if expected.is_none() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(WriteResponse {
            content: WrittenFile {
                path,
                sha: token.to_string(),
            },
        }),
    ))
}

/// The raw catalog document; an empty list before anything is published
pub async fn library_document(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = match state
        .store
        .read_file(&state.catalog_path)
        .await
        .map_err(api_error)?
    {
        Some(file) => file.content,
        None => b"[]".to_vec(),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert_eq!(validate_path("books/a.json").unwrap(), "books/a.json");
        assert_eq!(validate_path("/books.json/").unwrap(), "books.json");
        assert!(validate_path("").is_err());
        assert!(validate_path("../etc/passwd").is_err());
        assert!(validate_path("books//a.json").is_err());
        assert!(validate_path("books/./a.json").is_err());
    }

    #[test]
    fn test_api_error_status() {
        let conflict = QuireError::Conflict {
            path: "a".to_string(),
        };
        assert_eq!(api_error(conflict).0, StatusCode::CONFLICT);
        assert_eq!(
            api_error(QuireError::Validation("bad".to_string())).0,
            StatusCode::BAD_REQUEST
        );
    }
}
