//! In-memory stand-ins for the platform services, shared by unit tests.
#![allow(dead_code)]

use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::api::error::SystemError;
use crate::modules::storage::{
    model::{validate_key, StorageError, StorageResult, UploadOptions},
    repository::BlobStore,
};
use crate::modules::thumbnail::extractor::{ExtractError, FrameExtractor};
use crate::modules::uploader::client::{ProcessorClient, ProcessorClientError};
use crate::modules::video::{
    model::{NewVideo, ProcessVideoPayload},
    repository::VideoRepository,
    schema::{ProcessedVideo, VideoEntity},
};

#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
    failing_buckets: Mutex<HashSet<String>>,
    downloads: AtomicUsize,
    uploads: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn insert(&self, bucket: &str, path: &str, data: Bytes) {
        self.objects.lock().unwrap().insert((bucket.to_string(), path.to_string()), data);
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(&(bucket.to_string(), path.to_string())).cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn fail_uploads_to(&self, bucket: &str) {
        self.failing_buckets.lock().unwrap().insert(bucket.to_string());
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn download(&self, bucket: &str, path: &str) -> StorageResult<Bytes> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        validate_key(path)?;
        self.get(bucket, path).ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> StorageResult<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        validate_key(path)?;

        if self.failing_buckets.lock().unwrap().contains(bucket) {
            return Err(StorageError::Backend {
                status: 507,
                message: "storage quota exceeded".to_string(),
            });
        }

        let mut objects = self.objects.lock().unwrap();
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) && !options.upsert {
            return Err(StorageError::Conflict(path.to_string()));
        }
        objects.insert(key, data);
        Ok(format!("{}/{}", bucket, path))
    }
}

#[derive(Default)]
pub struct InMemoryVideoRepository {
    rows: Mutex<Vec<VideoEntity>>,
    next_id: AtomicI64,
    fail: Mutex<bool>,
}

impl InMemoryVideoRepository {
    pub fn records(&self) -> Vec<VideoEntity> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &NewVideo) -> Result<VideoEntity, SystemError> {
        if *self.fail.lock().unwrap() {
            return Err(SystemError::DatabaseError(
                "null value in column \"uploader_id\" violates not-null constraint".into(),
            ));
        }

        let entity = VideoEntity {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uploader_id: video.uploader_id.clone(),
            storage_path: video.storage_path.clone(),
            thumbnail_path: video.thumbnail_path.clone(),
            description: video.description.clone(),
            tags: video.tags.clone(),
            created_at: chrono::Utc::now(),
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }
}

/// Frame extractor that never spawns a process.
pub struct StubExtractor {
    outcome: Result<Bytes, String>,
    calls: Mutex<Vec<Duration>>,
}

impl StubExtractor {
    pub fn succeeding(frame: &'static [u8]) -> Self {
        Self { outcome: Ok(Bytes::from_static(frame)), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(stderr: &str) -> Self {
        Self { outcome: Err(stderr.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FrameExtractor for StubExtractor {
    async fn extract_frame(&self, _video: &[u8], offset: Duration) -> Result<Bytes, ExtractError> {
        self.calls.lock().unwrap().push(offset);
        match &self.outcome {
            Ok(frame) => Ok(frame.clone()),
            Err(stderr) => Err(ExtractError::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
        }
    }
}

/// Processor client answering from a fixed outcome and recording payloads.
pub struct StubProcessorClient {
    outcome: Result<i64, String>,
    payloads: Mutex<Vec<ProcessVideoPayload>>,
}

impl StubProcessorClient {
    pub fn succeeding(video_id: i64) -> Self {
        Self { outcome: Ok(video_id), payloads: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: &str) -> Self {
        Self { outcome: Err(error.to_string()), payloads: Mutex::new(Vec::new()) }
    }

    pub fn payloads(&self) -> Vec<ProcessVideoPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProcessorClient for StubProcessorClient {
    async fn process(
        &self,
        payload: &ProcessVideoPayload,
    ) -> Result<ProcessedVideo, ProcessorClientError> {
        self.payloads.lock().unwrap().push(payload.clone());
        match &self.outcome {
            Ok(video_id) => {
                let owner = payload.owner_id.clone().unwrap_or_default();
                Ok(ProcessedVideo {
                    video_id: *video_id,
                    thumbnail_path: format!("{}/thumbnail_1.jpg", owner),
                    video_path: payload.video_path.clone().unwrap_or_default(),
                })
            }
            Err(error) => Err(ProcessorClientError::Rejected(error.clone())),
        }
    }
}

/// `log` sink keeping every record per thread, so parallel tests only see
/// their own lines.
struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, String)>>,
}

static CAPTURE: CaptureLogger = CaptureLogger { records: Mutex::new(Vec::new()) };
static CAPTURE_INIT: Once = Once::new();

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!("{}", record.args());
        self.records.lock().unwrap().push((thread::current().id(), line));
    }

    fn flush(&self) {}
}

pub fn capture_logs() {
    CAPTURE_INIT.call_once(|| {
        log::set_logger(&CAPTURE).expect("another logger is already installed");
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Lines logged so far by the calling thread.
pub fn captured_lines() -> Vec<String> {
    let id = thread::current().id();
    CAPTURE
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(thread, _)| *thread == id)
        .map(|(_, line)| line.clone())
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn test_create_video_returns_stored_row(pool: sqlx::PgPool) {
    use crate::modules::video::repository_pg::VideoPgRepository;

    let repo = VideoPgRepository::new(pool);

    let first = repo
        .create(&NewVideo {
            uploader_id: "u1".to_string(),
            storage_path: "u1/123-abc.mp4".to_string(),
            thumbnail_path: "u1/thumbnail_123-def.jpg".to_string(),
            description: Some("first clip".to_string()),
            tags: vec!["skate".to_string(), "summer".to_string()],
        })
        .await
        .unwrap();
    let second = repo
        .create(&NewVideo {
            uploader_id: "u1".to_string(),
            storage_path: "u1/123-abc.mp4".to_string(),
            thumbnail_path: "u1/thumbnail_456-ghi.jpg".to_string(),
            description: None,
            tags: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(first.uploader_id, "u1");
    assert_eq!(first.storage_path, "u1/123-abc.mp4");
    assert_eq!(first.tags, vec!["skate", "summer"]);
    assert_eq!(first.description.as_deref(), Some("first clip"));
    assert!(second.id > first.id);
    assert!(second.tags.is_empty());
    assert!(second.description.is_none());
    assert!(second.created_at >= first.created_at);
}
