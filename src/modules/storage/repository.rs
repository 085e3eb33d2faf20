use bytes::Bytes;

use crate::modules::storage::model::{StorageResult, UploadOptions};

/// Opaque key/blob store addressed by bucket and path.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn download(&self, bucket: &str, path: &str) -> StorageResult<Bytes>;

    /// Writes `data` at `path` and returns the stored key.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String>;
}
