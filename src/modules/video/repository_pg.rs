use crate::{
    api::error,
    modules::video::{model::NewVideo, repository::VideoRepository, schema::VideoEntity},
};

#[derive(Clone)]
pub struct VideoPgRepository {
    pool: sqlx::PgPool,
}

impl VideoPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for VideoPgRepository {
    async fn create(&self, video: &NewVideo) -> Result<VideoEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, VideoEntity>(
            r#"
            INSERT INTO videos (uploader_id, storage_path, thumbnail_path, description, tags)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&video.uploader_id)
        .bind(&video.storage_path)
        .bind(&video.thumbnail_path)
        .bind(&video.description)
        .bind(&video.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }
}
