use bytes::Bytes;
use reqwest::{header, StatusCode, Url};
use serde::Deserialize;

use crate::modules::storage::{
    model::{validate_key, StorageError, StorageResult, UploadOptions},
    repository::BlobStore,
};

/// Supabase Storage REST client (`/storage/v1/object/{bucket}/{path}`).
#[derive(Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Error payload returned by the storage API. `statusCode` is a string and
/// may differ from the HTTP status (missing objects come back as HTTP 400).
#[derive(Debug, Deserialize)]
struct StorageApiError {
    #[serde(rename = "statusCode")]
    status_code: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

impl SupabaseStorage {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { client, base_url: base_url.into(), api_key: api_key.into() }
    }

    fn object_url(&self, bucket: &str, path: &str) -> StorageResult<Url> {
        validate_key(path)?;
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::InvalidKey(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidKey(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["storage", "v1", "object", bucket])
            .extend(path.split('/'));
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn into_error(path: &str, response: reqwest::Response) -> StorageError {
        let http_status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<StorageApiError>(&text).ok();

        let status = body
            .as_ref()
            .and_then(|b| b.status_code.as_deref())
            .and_then(|code| code.parse::<u16>().ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(http_status);

        let message = body
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.is_empty())
            .unwrap_or(text);

        match status {
            StatusCode::NOT_FOUND => StorageError::NotFound(path.to_string()),
            StatusCode::CONFLICT => StorageError::Conflict(path.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::AccessDenied(message),
            other => StorageError::Backend { status: other.as_u16(), message },
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for SupabaseStorage {
    async fn download(&self, bucket: &str, path: &str) -> StorageResult<Bytes> {
        let url = self.object_url(bucket, path)?;
        let response = self.authorized(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(Self::into_error(path, response).await);
        }

        Ok(response.bytes().await?)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        let url = self.object_url(bucket, path)?;
        let mut request = self
            .authorized(self.client.post(url))
            .header(header::CONTENT_TYPE, &options.content_type)
            .header("x-upsert", if options.upsert { "true" } else { "false" });

        if let Some(seconds) = &options.cache_control {
            request = request.header(header::CACHE_CONTROL, format!("max-age={}", seconds));
        }

        let response = request.body(data).send().await?;

        if !response.status().is_success() {
            return Err(Self::into_error(path, response).await);
        }

        let stored = response.json::<UploadResponse>().await.ok().and_then(|r| r.key);
        Ok(stored.unwrap_or_else(|| format!("{}/{}", bucket, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(server: &mockito::ServerGuard) -> SupabaseStorage {
        SupabaseStorage::new(reqwest::Client::new(), server.url(), "service-key")
    }

    #[actix_web::test]
    async fn test_download_returns_object_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/storage/v1/object/videos/u1/123-abc.mp4")
            .match_header("apikey", "service-key")
            .match_header("authorization", "Bearer service-key")
            .with_status(200)
            .with_body(b"raw video")
            .create_async()
            .await;

        let bytes = storage(&server).download("videos", "u1/123-abc.mp4").await.unwrap();

        assert_eq!(&bytes[..], b"raw video");
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn test_download_maps_missing_object_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/storage/v1/object/videos/u1/missing.mp4")
            .with_status(400)
            .with_body(r#"{"statusCode":"404","error":"not_found","message":"Object not found"}"#)
            .create_async()
            .await;

        let err = storage(&server).download("videos", "u1/missing.mp4").await.unwrap_err();

        assert!(matches!(err, StorageError::NotFound(path) if path == "u1/missing.mp4"));
    }

    #[actix_web::test]
    async fn test_upload_sends_no_upsert_and_cache_control() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/thumbnails/u1/thumbnail_1.jpg")
            .match_header("x-upsert", "false")
            .match_header("content-type", "image/jpeg")
            .match_header("cache-control", "max-age=3600")
            .match_body(mockito::Matcher::Exact("jpeg".to_string()))
            .with_status(200)
            .with_body(r#"{"Key":"thumbnails/u1/thumbnail_1.jpg"}"#)
            .create_async()
            .await;

        let options = UploadOptions::new("image/jpeg").cache_control("3600");
        let key = storage(&server)
            .upload("thumbnails", "u1/thumbnail_1.jpg", Bytes::from_static(b"jpeg"), &options)
            .await
            .unwrap();

        assert_eq!(key, "thumbnails/u1/thumbnail_1.jpg");
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn test_upload_maps_duplicate_to_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/videos/u1/a.mp4")
            .with_status(400)
            .with_body(
                r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#,
            )
            .create_async()
            .await;

        let err = storage(&server)
            .upload(
                "videos",
                "u1/a.mp4",
                Bytes::from_static(b"x"),
                &UploadOptions::new("video/mp4"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[actix_web::test]
    async fn test_upload_maps_forbidden_to_access_denied() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/storage/v1/object/videos/u1/a.mp4")
            .with_status(403)
            .with_body(
                r#"{"statusCode":"403","error":"Unauthorized","message":"new row violates row-level security policy"}"#,
            )
            .create_async()
            .await;

        let err = storage(&server)
            .upload(
                "videos",
                "u1/a.mp4",
                Bytes::from_static(b"x"),
                &UploadOptions::new("video/mp4"),
            )
            .await
            .unwrap_err();

        assert!(
            matches!(err, StorageError::AccessDenied(msg) if msg.contains("row-level security"))
        );
    }

    #[actix_web::test]
    async fn test_invalid_key_is_rejected_before_request() {
        let server = mockito::Server::new_async().await;
        let err = storage(&server).download("videos", "../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
