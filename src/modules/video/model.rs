use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::{
    api::error,
    constants::MISSING_FIELDS_MESSAGE,
    modules::{storage::model::StorageError, thumbnail::extractor::ExtractError},
};

/// Body of the trigger call, as it arrives on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProcessVideoPayload {
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 32, message = "at most 32 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

/// Validated processing request. Owner and path are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRequest {
    pub owner_id: String,
    pub video_path: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl TryFrom<ProcessVideoPayload> for ProcessingRequest {
    type Error = PipelineError;

    fn try_from(payload: ProcessVideoPayload) -> Result<Self, Self::Error> {
        let owner_id = non_blank(payload.owner_id);
        let video_path = non_blank(payload.video_path);

        let (Some(owner_id), Some(video_path)) = (owner_id, video_path) else {
            return Err(PipelineError::MissingFields);
        };

        let tags = payload
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(Self { owner_id, video_path, description: non_blank(payload.description), tags })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Record to insert once the thumbnail exists.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub uploader_id: String,
    pub storage_path: String,
    pub thumbnail_path: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Per-invocation progress. A failure is reported as a [`PipelineError`]
/// carrying the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Downloading,
    Extracting,
    UploadingThumbnail,
    Persisting,
    Succeeded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Downloading => "downloading",
            PipelineStage::Extracting => "extracting",
            PipelineStage::UploadingThumbnail => "uploading_thumbnail",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,
    #[error("Error descargando video: {0}")]
    DownloadFailed(#[source] StorageError),
    #[error("Error generando miniatura: {0}")]
    ExtractionFailed(#[source] ExtractError),
    #[error("Error subiendo miniatura: {0}")]
    ThumbnailUploadFailed(#[source] StorageError),
    #[error("Error guardando video: {0}")]
    RecordInsertFailed(#[source] error::SystemError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::MissingFields => PipelineStage::Received,
            PipelineError::DownloadFailed(_) => PipelineStage::Downloading,
            PipelineError::ExtractionFailed(_) => PipelineStage::Extracting,
            PipelineError::ThumbnailUploadFailed(_) => PipelineStage::UploadingThumbnail,
            PipelineError::RecordInsertFailed(_) => PipelineStage::Persisting,
        }
    }
}

impl From<PipelineError> for error::Error {
    fn from(value: PipelineError) -> Self {
        match value {
            PipelineError::MissingFields => error::Error::bad_request(value.to_string()),
            _ => error::Error::processing(value.to_string()),
        }
    }
}
