use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Always-allow policy of the processor endpoint: any origin, answered with `*`.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .allowed_header("apikey")
        .allowed_header("x-client-info")
        .max_age(3600)
}
