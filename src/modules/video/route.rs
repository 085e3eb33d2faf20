use crate::modules::video::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/functions/v1").service(process_video).service(preflight));
}
