use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{Env, INVALID_FILE_TYPE_MESSAGE, NO_FILE_SELECTED_MESSAGE};
use crate::utils::timestamped_name;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{}", NO_FILE_SELECTED_MESSAGE)]
    NoFileSelected,
    #[error("Usuario no identificado")]
    MissingOwner,
    #[error("{}", INVALID_FILE_TYPE_MESSAGE)]
    InvalidFileType { mime_type: String },
    #[error("El archivo es demasiado grande. Máximo {}MB", .max_size / MIB)]
    FileTooLarge { size: u64, max_size: u64 },
    #[error("No se pudo leer el archivo: {0}")]
    ReadFailed(#[from] std::io::Error),
    #[error("Error al subir el video: {0}")]
    StoreWriteFailed(String),
    #[error("Error al procesar el video: {0}")]
    ProcessingFailed(String),
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub video_bucket: String,
    pub message_timeout: Duration,
}

impl UploadConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            max_file_size: env.max_upload_size,
            video_bucket: env.video_bucket.clone(),
            message_timeout: env.status_message_timeout,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * MIB,
            video_bucket: "videos".to_string(),
            message_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
enum VideoSource {
    Path(PathBuf),
    #[cfg(test)]
    Memory(Bytes),
}

/// A file picked by the user. Name, declared type and size are known up
/// front; content is only read when the file is uploaded.
#[derive(Debug, Clone)]
pub struct LocalVideoFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    source: VideoSource,
}

impl LocalVideoFile {
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let mime_type =
            mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();

        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            source: VideoSource::Path(path.to_path_buf()),
        })
    }

    #[cfg(test)]
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            source: VideoSource::Memory(data),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|ext| ext.to_str())
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Size as shown next to the selection, e.g. `12.34 MB`.
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size as f64 / MIB as f64)
    }

    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            VideoSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
            #[cfg(test)]
            VideoSource::Memory(data) => Ok(data.clone()),
        }
    }
}

/// Raw bytes ready to be written under the owner's folder.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: String,
    pub raw_bytes: Bytes,
    pub file_extension: Option<String>,
}

/// `{owner_id}/{unix_millis}-{suffix}.{ext}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVideoPath {
    pub owner_id: String,
    pub generated_name: String,
    pub full_path: String,
}

impl StoredVideoPath {
    pub fn generate(owner_id: &str, extension: Option<&str>) -> Self {
        let generated_name = timestamped_name("", extension);
        let full_path = format!("{}/{}", owner_id, generated_name);
        Self { owner_id: owner_id.to_string(), generated_name, full_path }
    }
}

/// Splits the free-text tags field (`"tag1, tag2"`) keeping order.
pub fn parse_tags(input: &str) -> Vec<String> {
    input.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(String::from).collect()
}
