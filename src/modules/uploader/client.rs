use thiserror::Error;

use crate::modules::video::{
    model::ProcessVideoPayload,
    schema::{ProcessedVideo, ProcessorReply},
};

#[derive(Debug, Error)]
pub enum ProcessorClientError {
    /// The processor answered with `success: false`; carries its `error` verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected processor reply ({status}): {body}")]
    InvalidReply { status: u16, body: String },
}

/// Synchronous trigger of the server-side processor.
#[async_trait::async_trait]
pub trait ProcessorClient: Send + Sync {
    async fn process(
        &self,
        payload: &ProcessVideoPayload,
    ) -> Result<ProcessedVideo, ProcessorClientError>;
}

/// Calls `{functions_url}/video-processor` over HTTP.
#[derive(Clone)]
pub struct HttpProcessorClient {
    client: reqwest::Client,
    functions_url: String,
    api_key: String,
}

impl HttpProcessorClient {
    pub fn new(
        client: reqwest::Client,
        functions_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { client, functions_url: functions_url.into(), api_key: api_key.into() }
    }
}

#[async_trait::async_trait]
impl ProcessorClient for HttpProcessorClient {
    async fn process(
        &self,
        payload: &ProcessVideoPayload,
    ) -> Result<ProcessedVideo, ProcessorClientError> {
        let url = format!("{}/video-processor", self.functions_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ProcessorReply>(&body) {
            Ok(ProcessorReply::Processed(reply)) if status.is_success() => {
                log::debug!("Processor replied at {}: {}", reply.timestamp, reply.message);
                Ok(reply.video)
            }
            Ok(ProcessorReply::Failed(reply)) => {
                Err(ProcessorClientError::Rejected(reply.error.into_owned()))
            }
            _ => Err(ProcessorClientError::InvalidReply { status: status.as_u16(), body }),
        }
    }
}
