use std::sync::Arc;

use crate::constants::VIDEO_CACHE_CONTROL;
use crate::modules::storage::{model::UploadOptions, repository::BlobStore};
use crate::modules::uploader::{
    client::ProcessorClient,
    model::{LocalVideoFile, StoredVideoPath, UploadConfig, UploadError, UploadRequest},
};
use crate::modules::video::{model::ProcessVideoPayload, schema::ProcessedVideo};

#[derive(Clone)]
pub struct UploaderService {
    storage: Arc<dyn BlobStore>,
    processor: Arc<dyn ProcessorClient>,
    config: UploadConfig,
}

impl UploaderService {
    pub fn with_dependencies(
        storage: Arc<dyn BlobStore>,
        processor: Arc<dyn ProcessorClient>,
        config: UploadConfig,
    ) -> Self {
        log::info!("UploaderService initialized (bucket: {})", config.video_bucket);
        Self { storage, processor, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Local checks only: declared media type and size ceiling.
    pub fn validate(&self, file: &LocalVideoFile) -> Result<(), UploadError> {
        if !file.is_video() {
            return Err(UploadError::InvalidFileType { mime_type: file.mime_type.clone() });
        }

        if file.size > self.config.max_file_size {
            return Err(UploadError::FileTooLarge {
                size: file.size,
                max_size: self.config.max_file_size,
            });
        }

        Ok(())
    }

    /// Writes the raw video under `{owner_id}/` without overwriting anything.
    pub async fn upload(
        &self,
        file: &LocalVideoFile,
        owner_id: &str,
    ) -> Result<StoredVideoPath, UploadError> {
        if owner_id.trim().is_empty() {
            return Err(UploadError::MissingOwner);
        }
        self.validate(file)?;

        let request = UploadRequest {
            owner_id: owner_id.to_string(),
            raw_bytes: file.read().await?,
            file_extension: file.extension().map(str::to_string),
        };
        let stored =
            StoredVideoPath::generate(&request.owner_id, request.file_extension.as_deref());

        let options = UploadOptions::new(file.mime_type.clone()).cache_control(VIDEO_CACHE_CONTROL);
        self.storage
            .upload(&self.config.video_bucket, &stored.full_path, request.raw_bytes, &options)
            .await
            .map_err(|e| UploadError::StoreWriteFailed(e.to_string()))?;

        log::info!("Video stored at {}/{}", self.config.video_bucket, stored.full_path);
        Ok(stored)
    }

    /// One synchronous processor call; errors are passed through, never retried.
    pub async fn submit_for_processing(
        &self,
        path: &StoredVideoPath,
        owner_id: &str,
        description: Option<String>,
        tags: Vec<String>,
    ) -> Result<ProcessedVideo, UploadError> {
        let payload = ProcessVideoPayload {
            owner_id: Some(owner_id.to_string()),
            video_path: Some(path.full_path.clone()),
            description,
            tags: if tags.is_empty() { None } else { Some(tags) },
        };

        self.processor
            .process(&payload)
            .await
            .map_err(|e| UploadError::ProcessingFailed(e.to_string()))
    }
}
