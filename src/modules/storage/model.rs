use thiserror::Error;

/// Blob store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    Conflict(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Per-write options. Writes never overwrite unless `upsert` is set.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control: Option<String>,
    pub upsert: bool,
}

impl UploadOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self { content_type: content_type.into(), cache_control: None, upsert: false }
    }

    pub fn cache_control(mut self, seconds: impl Into<String>) -> Self {
        self.cache_control = Some(seconds.into());
        self
    }
}

/// Rejects keys that would escape their bucket or address nothing.
pub fn validate_key(path: &str) -> StorageResult<()> {
    if path.is_empty() || path.starts_with('/') {
        return Err(StorageError::InvalidKey(path.to_string()));
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(StorageError::InvalidKey(path.to_string()));
    }
    Ok(())
}
