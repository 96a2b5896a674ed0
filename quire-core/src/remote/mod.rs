//! Remote content store: versioned files addressed by path
//!
//! Every file carries an opaque [`VersionToken`]. Writers hand back the token
//! they read; the store refuses the write with [`QuireError::Conflict`] when
//! the file changed in between.

mod http;
mod local;

pub use http::HttpContentStore;
pub use local::LocalContentStore;

use crate::error::{QuireError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque version of a remote file (a blob `sha`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file as read from the remote store
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub token: VersionToken,
}

/// The operations Quire needs from a remote content store
#[async_trait]
pub trait RemoteContentStore: Send + Sync {
    /// Read a file; `Ok(None)` when it does not exist
    async fn read_file(&self, path: &str) -> Result<Option<RemoteFile>>;

    /// Create or replace a file
    ///
    /// `expected` must be the token of the current version, or `None` when the
    /// file is being created. Returns the token of the new version.
    async fn write_file(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken>;
}

/// Percent-encode each path segment independently, keeping `/` separators
pub fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Base64 transport encoding of raw bytes
pub fn encode_content(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a base64 transport payload, tolerating line breaks
pub fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| QuireError::Validation(format!("invalid base64 content: {}", e)))
}
