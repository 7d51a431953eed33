//! Response construction and serialization.
//!
//! Header names live lowercase in the `HeaderMap` and are written in title
//! case (`Pagination-Total-Pages`). `Content-Length` is always computed from
//! the body; a stored value is ignored.

use super::{header, HttpResponse};
use bytes::Bytes;
use http::{StatusCode, Version};

/// CRLF line terminator
const CRLF: &[u8] = b"\r\n";

/// A response with no body.
pub fn empty(status: StatusCode) -> HttpResponse {
    let mut response = HttpResponse::new(Bytes::new());
    *response.status_mut() = status;
    response
}

/// A response carrying an already encoded body.
///
/// `Content-Type` is left to the connection layer, which stamps it on every
/// response together with the other transport headers.
pub fn with_body(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = HttpResponse::new(body.into());
    *response.status_mut() = status;
    response
}

/// An error response whose body is `{"error": detail}`.
pub fn error(status: StatusCode, detail: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": detail }).to_string();
    with_body(status, body)
}

/// Serializes the response to a new byte vector.
pub fn serialize(response: &HttpResponse) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + response.body().len());
    serialize_into(response, &mut buf);
    buf
}

/// Serializes the response into an existing buffer.
pub fn serialize_into(response: &HttpResponse, buf: &mut Vec<u8>) {
    let version: &[u8] = match response.version() {
        Version::HTTP_10 => b"HTTP/1.0",
        _ => b"HTTP/1.1",
    };
    let status = response.status();

    buf.extend_from_slice(version);
    buf.push(b' ');
    buf.extend_from_slice(status.as_str().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(status.canonical_reason().unwrap_or("").as_bytes());
    buf.extend_from_slice(CRLF);

    for (name, value) in response.headers() {
        if *name == header::CONTENT_LENGTH {
            continue;
        }
        title_case_into(name.as_str().as_bytes(), buf);
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(CRLF);
    }

    buf.extend_from_slice(b"Content-Length: ");
    buf.extend_from_slice(response.body().len().to_string().as_bytes());
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(response.body());
}

/// Writes `pagination-total-pages` as `Pagination-Total-Pages`.
fn title_case_into(name: &[u8], buf: &mut Vec<u8>) {
    let mut upper = true;
    for &byte in name {
        buf.push(if upper { byte.to_ascii_uppercase() } else { byte });
        upper = byte == b'-';
    }
}
