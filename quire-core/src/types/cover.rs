//! Cover image blob owned by a book

use serde::{Deserialize, Serialize};

/// An opaque cover image
///
/// The bytes are stored base64 encoded so the whole draft collection stays
/// plain JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cover {
    /// Original filename, used again on export
    pub filename: String,

    /// MIME type guessed from the filename
    pub mime_type: String,

    /// Raw image bytes
    #[serde(with = "base64_serde")]
    pub data: Vec<u8>,
}

impl Cover {
    /// Create a cover from a filename and its bytes
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_for_filename(&filename).to_string();
        Self {
            filename,
            mime_type,
            data,
        }
    }

    /// `data:` URL suitable for an image preview
    pub fn to_data_url(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

fn mime_for_filename(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Base64 serialization for binary data
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_survives_json() {
        let cover = Cover::new("front.PNG", vec![0, 159, 146, 150, 255]);
        assert_eq!(cover.mime_type, "image/png");

        let json = serde_json::to_string(&cover).unwrap();
        assert!(json.contains("AJ+Slv8="));
        let back: Cover = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cover);
    }

    #[test]
    fn test_data_url() {
        let cover = Cover::new("c.jpg", b"abc".to_vec());
        assert_eq!(cover.to_data_url(), "data:image/jpeg;base64,YWJj");
    }
}
