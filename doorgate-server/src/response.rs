//! JSON responses and the error-to-status translator

use bytes::Bytes;
use doorgate_core::{DoorgateError, ErrorKind};
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error};

pub type BoxBody = Full<Bytes>;

/// JSON response with the service headers set
pub fn json_response(status: StatusCode, body: Value) -> Response<BoxBody> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
        .headers_mut()
        .insert(SERVER, HeaderValue::from_static("doorgate/0.1.0"));
    response
}

/// `{"message": ...}` with the given status
pub fn message_response(status: StatusCode, message: impl Into<String>) -> Response<BoxBody> {
    json_response(status, json!({ "message": message.into() }))
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The single place errors become HTTP responses. Internal details are
/// logged here and replaced by a generic message.
pub fn error_response(err: &DoorgateError) -> Response<BoxBody> {
    let kind = err.kind();
    match kind {
        ErrorKind::Internal => error!("Request failed: {}", err),
        _ => debug!("Request rejected: {}", err),
    }

    message_response(status_for(kind), err.public_message())
}
