use crate::{
    api::error,
    modules::video::{model::NewVideo, schema::VideoEntity},
};

#[async_trait::async_trait]
pub trait VideoRepository {
    /// Inserts one record and returns it with its store-assigned id.
    async fn create(&self, video: &NewVideo) -> Result<VideoEntity, error::SystemError>;
}
