use actix_web::{options, post, web, HttpResponse};

use crate::api::{error, success};
use crate::constants::PROCESSED_MESSAGE;
use crate::modules::video::{
    model::ProcessVideoPayload, schema::ProcessedVideo, service::VideoProcessorService,
};
use crate::utils::ValidatedJson;

#[post("/video-processor")]
pub async fn process_video(
    service: web::Data<VideoProcessorService>,
    payload: ValidatedJson<ProcessVideoPayload>,
) -> Result<success::Success<ProcessedVideo>, error::Error> {
    let processed = service.process(payload.0).await?;
    Ok(success::Success::ok(processed).message(PROCESSED_MESSAGE))
}

/// Bare OPTIONS requests; CORS preflights are answered by the middleware.
#[options("/video-processor")]
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}
