//! Response construction helpers.
//!
//! Responses are assembled with `Response::new` and header inserts rather
//! than the fallible builder, so no path here can panic.

use std::convert::Infallible;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use relief_core::error::ReliefError;

pub type BoxBody = http_body_util::combinators::UnsyncBoxBody<Bytes, Infallible>;

pub fn empty_body() -> BoxBody {
    BoxBody::new(Full::new(Bytes::new()).map_err(|never| match never {}))
}

pub fn full_body(bytes: impl Into<Bytes>) -> BoxBody {
    BoxBody::new(Full::new(bytes.into()).map_err(|never| match never {}))
}

/// 204 with no body, used for CORS preflight.
pub fn no_content() -> Response<BoxBody> {
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = StatusCode::NO_CONTENT;
    resp
}

/// Serialize `value` as the JSON body of a response with `status`.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<BoxBody> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut resp = Response::new(full_body(bytes));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }
        Err(e) => {
            error!("failed to serialize response body: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `{"error": message}` with `status`.
pub fn error_response(status: StatusCode, message: &str) -> Response<BoxBody> {
    let body = serde_json::json!({ "error": message });
    let mut resp = Response::new(full_body(body.to_string()));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// Map a service error onto its status and public message.
pub fn from_error(err: &ReliefError) -> Response<BoxBody> {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("request failed: {err}");
    } else {
        warn!("request rejected: {err}");
    }
    error_response(status, &err.public_message())
}

pub fn not_found() -> Response<BoxBody> {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// 405 carrying the methods the path does support.
pub fn method_not_allowed(allow: &str) -> Response<BoxBody> {
    let mut resp = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    if let Ok(value) = HeaderValue::from_str(allow) {
        resp.headers_mut().insert(header::ALLOW, value);
    }
    resp
}

/// Attach the CORS headers every response carries.
pub fn cors_response(mut resp: Response<BoxBody>, origin: &HeaderValue) -> Response<BoxBody> {
    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PATCH, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, content-type"),
    );
    resp
}
