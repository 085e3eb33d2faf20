use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::api::error::ErrorBody;

/// Row of the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VideoEntity {
    pub id: i64,
    pub uploader_id: String,
    pub storage_path: String,
    pub thumbnail_path: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Success payload of the processor, flattened into the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedVideo {
    pub video_id: i64,
    pub thumbnail_path: String,
    pub video_path: String,
}

impl From<VideoEntity> for ProcessedVideo {
    fn from(entity: VideoEntity) -> Self {
        Self {
            video_id: entity.id,
            thumbnail_path: entity.thumbnail_path,
            video_path: entity.storage_path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessedReply {
    pub message: String,
    #[serde(flatten)]
    pub video: ProcessedVideo,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// What a caller of the processor gets back: exactly one of the two bodies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProcessorReply {
    Processed(ProcessedReply),
    Failed(ErrorBody),
}
