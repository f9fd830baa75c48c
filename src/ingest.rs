use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use crate::store::models::{NewSource, SourceKind};

/// Files above this size are rejected before any read is attempted.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("File is too large (> 10MB).")]
    TooLarge { size: u64 },
    #[error("Could not read file.")]
    Unreadable(#[source] std::io::Error),
    #[error("Invalid data URL")]
    InvalidDataUrl,
}

/// Progress of a file pick in the add-source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Reading,
    Ready,
    Failed(String),
}

impl UploadStatus {
    pub fn message(&self) -> &str {
        match self {
            UploadStatus::Idle => "",
            UploadStatus::Reading => "Reading file...",
            UploadStatus::Ready => "File ready!",
            UploadStatus::Failed(msg) => msg,
        }
    }
}

impl From<&IngestError> for UploadStatus {
    fn from(err: &IngestError) -> Self {
        UploadStatus::Failed(err.to_string())
    }
}

/// A file read into memory, ready to become a `File` source.
#[derive(Debug, Clone)]
pub struct IngestedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl IngestedFile {
    pub fn into_new_source(self, folder_id: Option<String>) -> NewSource {
        NewSource {
            name: self.name,
            folder_id,
            kind: SourceKind::File {
                mime_type: self.mime_type,
                data: self.data,
            },
        }
    }
}

/// Read a local file, enforcing the size ceiling first.
pub async fn ingest_file(path: &Path) -> Result<IngestedFile, IngestError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(IngestError::Unreadable)?;
    if metadata.len() > MAX_FILE_SIZE {
        tracing::warn!(path = %path.display(), size = metadata.len(), "file rejected: too large");
        return Err(IngestError::TooLarge {
            size: metadata.len(),
        });
    }

    let data = tokio::fs::read(path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "file could not be read");
        IngestError::Unreadable(e)
    })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
        .to_string();

    Ok(IngestedFile {
        name,
        mime_type,
        data,
    })
}

pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), IngestError> {
    let rest = url.strip_prefix("data:").ok_or(IngestError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(IngestError::InvalidDataUrl)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(IngestError::InvalidDataUrl)?;
    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME
    } else {
        mime_type
    };
    let data = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| IngestError::InvalidDataUrl)?;
    Ok((mime_type.to_string(), data))
}
