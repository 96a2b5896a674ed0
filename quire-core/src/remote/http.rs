//! REST client for a GitHub-contents style API

use super::{
    decode_content, encode_content, encode_path, RemoteContentStore, RemoteFile, VersionToken,
};
use crate::error::{QuireError, Result};
use crate::session::SessionContext;
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Remote content store reached over HTTP
///
/// `base_url` points at the contents root, e.g.
/// `https://api.github.com/repos/<owner>/<repo>/contents`. File paths are
/// appended with each segment percent-encoded.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    branch: Option<String>,
    session: Arc<SessionContext>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    /// `"none"` for files too large to be inlined
    #[serde(default)]
    encoding: Option<String>,
}

impl ContentsResponse {
    fn into_remote_file(self, path: &str) -> Result<RemoteFile> {
        match self.encoding.as_deref() {
            None | Some("base64") => {}
            Some(other) => {
                return Err(QuireError::Validation(format!(
                    "{} is served with '{}' encoding and cannot be read inline",
                    path, other
                )))
            }
        }
        Ok(RemoteFile {
            content: decode_content(&self.content)?,
            token: VersionToken::new(self.sha),
        })
    }
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenFile,
}

#[derive(Debug, Deserialize)]
struct WrittenFile {
    sha: String,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionContext>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            branch: None,
            session,
        }
    }

    /// Target a specific branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), encode_path(path))
    }

    async fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(
                header::USER_AGENT,
                concat!("quire/", env!("CARGO_PKG_VERSION")),
            );

        if let Some(token) = self.session.token().await {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }
}

/// Map a non-success response to the error kind the caller should see
async fn rejection(path: &str, response: reqwest::Response) -> QuireError {
    let status = response.status();
    match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => QuireError::Conflict {
            path: path.to_string(),
        },
        _ => QuireError::Remote {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        },
    }
}

#[async_trait]
impl RemoteContentStore for HttpContentStore {
    async fn read_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        let mut builder = self.request(reqwest::Method::GET, path).await;
        if let Some(branch) = &self.branch {
            builder = builder.query(&[("ref", branch)]);
        }

        let response = builder.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(path, response).await);
        }

        let body: ContentsResponse = response.json().await?;
        body.into_remote_file(path).map(Some)
    }

    async fn write_file(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken> {
        let body = WriteRequest {
            message,
            content: encode_content(&content),
            sha: expected.map(VersionToken::as_str),
            branch: self.branch.as_deref(),
        };

        let response = self
            .request(reqwest::Method::PUT, path)
            .await
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejection(path, response).await);
        }

        let written: WriteResponse = response.json().await?;
        Ok(VersionToken::new(written.content.sha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let store = HttpContentStore::new(
            "https://api.github.com/repos/acme/library/contents/",
            Arc::new(SessionContext::new()),
        );
        assert_eq!(
            store.url("books/Le Petit Prince.json"),
            "https://api.github.com/repos/acme/library/contents/books/Le%20Petit%20Prince.json"
        );
    }

    #[test]
    fn test_inline_base64_content_is_decoded() {
        let body: ContentsResponse = serde_json::from_str(
            r#"{"sha":"abc123","encoding":"base64","content":"W10=\n"}"#,
        )
        .unwrap();
        let file = body.into_remote_file("books.json").unwrap();
        assert_eq!(file.content, b"[]");
        assert_eq!(file.token.as_str(), "abc123");
    }

    #[test]
    fn test_large_file_without_inline_content_is_rejected() {
        let body: ContentsResponse = serde_json::from_str(
            r#"{"sha":"abc123","encoding":"none","content":"","size":2097152}"#,
        )
        .unwrap();
        let err = body.into_remote_file("books.json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert!(err.to_string().contains("books.json"));
    }

    #[test]
    fn test_write_request_omits_missing_sha() {
        let body = WriteRequest {
            message: "Publish",
            content: encode_content(b"hi"),
            sha: None,
            branch: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Publish", "content": "aGk="}));
    }
}
