use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::constants::{Env, THUMBNAIL_CONTENT_TYPE, VIDEO_CACHE_CONTROL};
use crate::modules::storage::{model::UploadOptions, repository::BlobStore};
use crate::modules::thumbnail::extractor::FrameExtractor;
use crate::modules::video::{
    model::{NewVideo, PipelineError, PipelineStage, ProcessVideoPayload, ProcessingRequest},
    repository::VideoRepository,
    schema::ProcessedVideo,
};
use crate::utils::timestamped_name;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub video_bucket: String,
    pub thumbnail_bucket: String,
    pub frame_offset: Duration,
}

impl ProcessorConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            video_bucket: env.video_bucket.clone(),
            thumbnail_bucket: env.thumbnail_bucket.clone(),
            frame_offset: env.thumbnail_offset,
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            video_bucket: "videos".to_string(),
            thumbnail_bucket: "thumbnails".to_string(),
            frame_offset: Duration::from_secs(1),
        }
    }
}

/// Turns a stored raw video into a thumbnail plus a `videos` record.
///
/// Steps run strictly in order and the first failure ends the invocation, so
/// a record is only written once its thumbnail exists.
#[derive(Clone)]
pub struct VideoProcessorService {
    storage: Arc<dyn BlobStore>,
    extractor: Arc<dyn FrameExtractor>,
    repo: Arc<dyn VideoRepository + Send + Sync>,
    config: ProcessorConfig,
}

impl VideoProcessorService {
    pub fn with_dependencies(
        storage: Arc<dyn BlobStore>,
        extractor: Arc<dyn FrameExtractor>,
        repo: Arc<dyn VideoRepository + Send + Sync>,
        config: ProcessorConfig,
    ) -> Self {
        log::info!(
            "VideoProcessorService initialized (videos: {}, thumbnails: {})",
            config.video_bucket,
            config.thumbnail_bucket
        );
        Self { storage, extractor, repo, config }
    }

    pub async fn process(
        &self,
        payload: ProcessVideoPayload,
    ) -> Result<ProcessedVideo, PipelineError> {
        let invocation = Uuid::now_v7();
        let span = tracing::info_span!("video_pipeline", %invocation);

        async move {
            tracing::info!(
                %invocation,
                stage = %PipelineStage::Received,
                "Processing request received"
            );

            let result = match ProcessingRequest::try_from(payload) {
                Ok(request) => self.run(invocation, request).await,
                Err(e) => Err(e),
            };

            match &result {
                Ok(video) => tracing::info!(
                    %invocation,
                    stage = %PipelineStage::Succeeded,
                    video_id = video.video_id,
                    thumbnail_path = %video.thumbnail_path,
                    "Video processed"
                ),
                Err(e) => tracing::error!(
                    %invocation,
                    stage = %e.stage(),
                    error = %e,
                    "Video processing failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        invocation: Uuid,
        request: ProcessingRequest,
    ) -> Result<ProcessedVideo, PipelineError> {
        tracing::info!(
            %invocation,
            stage = %PipelineStage::Downloading,
            owner_id = %request.owner_id,
            video_path = %request.video_path,
            "Downloading video"
        );
        let video = self
            .storage
            .download(&self.config.video_bucket, &request.video_path)
            .await
            .map_err(PipelineError::DownloadFailed)?;

        tracing::info!(
            %invocation,
            stage = %PipelineStage::Extracting,
            video_size = video.len(),
            "Extracting thumbnail"
        );
        let frame = self
            .extractor
            .extract_frame(&video, self.config.frame_offset)
            .await
            .map_err(PipelineError::ExtractionFailed)?;
        drop(video);

        let thumbnail_path =
            format!("{}/{}", request.owner_id, timestamped_name("thumbnail_", Some("jpg")));
        tracing::info!(
            %invocation,
            stage = %PipelineStage::UploadingThumbnail,
            thumbnail_path = %thumbnail_path,
            "Uploading thumbnail"
        );
        let options = UploadOptions::new(THUMBNAIL_CONTENT_TYPE).cache_control(VIDEO_CACHE_CONTROL);
        self.storage
            .upload(&self.config.thumbnail_bucket, &thumbnail_path, frame, &options)
            .await
            .map_err(PipelineError::ThumbnailUploadFailed)?;

        tracing::info!(%invocation, stage = %PipelineStage::Persisting, "Saving video record");
        let new_video = NewVideo {
            uploader_id: request.owner_id,
            storage_path: request.video_path,
            thumbnail_path,
            description: request.description,
            tags: request.tags,
        };
        let entity =
            self.repo.create(&new_video).await.map_err(PipelineError::RecordInsertFailed)?;

        Ok(ProcessedVideo::from(entity))
    }
}
