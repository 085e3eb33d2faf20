use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed { tool: String, status: String, stderr: String },

    #[error("{tool} produced no output frame")]
    MissingOutput { tool: String },

    #[error("working directory I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Pulls a single still frame out of an encoded video.
#[async_trait::async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frame(&self, video: &[u8], offset: Duration) -> Result<Bytes, ExtractError>;
}
