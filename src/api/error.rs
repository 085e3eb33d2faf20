use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Processing Failed: {0}")]
    Processing(Cow<'static, str>),
}

/// Failure body shared by every non-2xx reply of the processor.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub error: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn processing(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Processing(msg.into())
    }

    pub fn message(&self) -> Cow<'static, str> {
        match self {
            Error::BadRequest(msg) | Error::Processing(msg) => msg.clone(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: self.message(),
            timestamp: chrono::Utc::now(),
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // reqwest errors
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    // Custom Errors
    #[error("Configuration Error: {0}")]
    Config(Cow<'static, str>),
    #[error("Database Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("{:?}", err);
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unique constraint");
                    return SystemError::Conflict(format!("{constraint} violated").into());
                }
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    return SystemError::DatabaseError(db_err.message().to_string().into());
                }
            }
        }
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_bad_request_renders_failure_body() {
        let err = Error::bad_request("owner_id y video_path son requeridos");
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(res.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "owner_id y video_path son requeridos");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_processing_error_is_server_error() {
        let err = Error::processing("Error descargando video: File not found");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Error descargando video: File not found");
    }

    #[test]
    fn test_system_error_keeps_cause_through_io_error() {
        let cause = SystemError::DatabaseError("password authentication failed".into());
        let err = std::io::Error::other(cause);

        assert_eq!(err.to_string(), "Database Error : password authentication failed");
        assert!(err.get_ref().unwrap().downcast_ref::<SystemError>().is_some());
    }
}
