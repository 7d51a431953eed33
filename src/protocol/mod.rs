//! HTTP/1.x Protocol Implementation
//!
//! This module provides the small slice of HTTP/1.x the comments service
//! speaks: one request in, one response out, then the connection closes.
//! Requests and responses are plain `http` types with `Bytes` bodies.
//!
//! ## Modules
//!
//! - `header`: Header names the service reads and writes
//! - `parser`: Incremental parser for incoming request bytes
//! - `response`: Response constructors and wire serialization
//!
//! ## Example
//!
//! ```
//! use comments_service::protocol::{parse_request, response, StatusCode};
//!
//! let data = b"GET /comments HTTP/1.1\r\nEntity: e1\r\n\r\n";
//! let (request, consumed) = parse_request(data).unwrap().unwrap();
//! assert_eq!(request.uri().path(), "/comments");
//! assert_eq!(consumed, data.len());
//!
//! let bytes = response::serialize(&response::with_body(StatusCode::OK, "[]"));
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use bytes::Bytes;

pub mod header;
pub mod parser;
pub mod response;

/// A parsed request with its full body.
pub type HttpRequest = http::Request<Bytes>;

/// A response ready to be serialized.
pub type HttpResponse = http::Response<Bytes>;

// Re-export commonly used types for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};
pub use parser::{parse_request, HttpParser, ParseError, ParseResult};
