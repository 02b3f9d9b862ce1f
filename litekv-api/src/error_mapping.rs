use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use litekv_core::{Envelope, Error};

/// Maps a core `Error` to the status code the HTTP surface returns for it.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::ValidationFailure(_) => StatusCode::BAD_REQUEST,
        Error::NotFound => StatusCode::NOT_FOUND,
        Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::IoFailure(_) | Error::CorruptEntry(_) | Error::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Renders an `Error` as the standard failure envelope with the matching
/// status code.
pub fn error_response(err: Error) -> Response {
    let status = status_for(&err);
    (status, Json(Envelope::<()>::err(err.to_string()))).into_response()
}
