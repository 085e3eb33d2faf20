use std::{path::PathBuf, time::Duration};

use crate::api::error::SystemError;

pub const MISSING_FIELDS_MESSAGE: &str = "owner_id y video_path son requeridos";
pub const PROCESSED_MESSAGE: &str = "Video procesado correctamente";

pub const INVALID_FILE_TYPE_MESSAGE: &str = "Por favor selecciona un archivo de video válido";
pub const NO_FILE_SELECTED_MESSAGE: &str = "Por favor selecciona un archivo de video";
pub const UPLOADED_MESSAGE: &str = "Video subido exitosamente. Procesando...";
pub const PUBLISHED_MESSAGE: &str = "¡Video publicado exitosamente!";

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";
pub const VIDEO_CACHE_CONTROL: &str = "3600";

pub struct Env {
    pub supabase_url: String,
    pub service_role_key: Option<String>,
    pub anon_key: Option<String>,
    pub database_url: Option<String>,
    pub functions_url: String,
    pub video_bucket: String,
    pub thumbnail_bucket: String,
    pub ffmpeg_path: String,
    pub work_dir: PathBuf,
    pub thumbnail_offset: Duration,
    pub thumbnail_quality: u8,
    pub max_upload_size: u64,
    pub status_message_timeout: Duration,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let supabase_url = std::env::var("SUPABASE_URL")
            .expect("SUPABASE_URL must be set in .env file or environment variable")
            .trim_end_matches('/')
            .to_string();

        let service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok();
        let anon_key = std::env::var("SUPABASE_ANON_KEY").ok();
        let database_url = std::env::var("DATABASE_URL").ok();

        let functions_url = std::env::var("FUNCTIONS_URL")
            .unwrap_or_else(|_| format!("{}/functions/v1", supabase_url))
            .trim_end_matches('/')
            .to_string();

        let video_bucket = std::env::var("VIDEO_BUCKET").unwrap_or_else(|_| "videos".to_string());
        let thumbnail_bucket =
            std::env::var("THUMBNAIL_BUCKET").unwrap_or_else(|_| "thumbnails".to_string());
        let ffmpeg_path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
        let work_dir =
            std::env::var("WORK_DIR").map(PathBuf::from).unwrap_or_else(|_| std::env::temp_dir());

        let thumbnail_offset = std::env::var("THUMBNAIL_OFFSET_SECS")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .expect("THUMBNAIL_OFFSET_SECS must be a valid u64 integer");
        let thumbnail_quality = std::env::var("THUMBNAIL_QUALITY")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u8>()
            .expect("THUMBNAIL_QUALITY must be a valid u8 integer");
        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
            .parse::<u64>()
            .expect("MAX_UPLOAD_SIZE must be a valid u64 integer");
        let status_message_timeout = std::env::var("STATUS_MESSAGE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .expect("STATUS_MESSAGE_TIMEOUT_SECS must be a valid u64 integer");

        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        Env {
            supabase_url,
            service_role_key,
            anon_key,
            database_url,
            functions_url,
            video_bucket,
            thumbnail_bucket,
            ffmpeg_path,
            work_dir,
            thumbnail_offset,
            thumbnail_quality,
            max_upload_size,
            status_message_timeout,
            ip,
            port,
        }
    }

    pub fn service_role_key(&self) -> Result<&str, SystemError> {
        self.service_role_key.as_deref().ok_or_else(|| {
            SystemError::config("SUPABASE_SERVICE_ROLE_KEY must be set to run the processor")
        })
    }

    pub fn anon_key(&self) -> Result<&str, SystemError> {
        self.anon_key
            .as_deref()
            .ok_or_else(|| SystemError::config("SUPABASE_ANON_KEY must be set to upload videos"))
    }

    pub fn database_url(&self) -> Result<&str, SystemError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| SystemError::config("DATABASE_URL must be set to run the processor"))
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
