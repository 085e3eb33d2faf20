use actix_web::{web, FromRequest};
use futures_util::future::LocalBoxFuture;
use rand::Rng;
use validator::{Validate, ValidationErrors};

use crate::api::error;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 10;

/// Lowercase base36 suffix used to keep same-millisecond names apart.
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// `{prefix}{unix_millis}-{suffix}[.{extension}]`
pub fn timestamped_name(prefix: &str, extension: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let stem = format!("{}{}-{}", prefix, millis, random_suffix());
    match extension.filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join(", ")
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            let json = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = json.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(validation_message(&e).into()))?;
            Ok(ValidatedJson(model))
        })
    }
}
